//! Build script for lumen_3d_engine_renderer_vulkan
//!
//! Compiles the WGSL shaders under `shaders/` to SPIR-V with naga and writes
//! them to OUT_DIR, where the pipeline code picks them up with `include_bytes!`.
//! Shader errors therefore surface during `cargo build`.

use std::env;
use std::fs;
use std::path::Path;

const SHADERS: &[&str] = &["simple_shader"];

fn main() {
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set");

    for name in SHADERS {
        let source_path = format!("shaders/{}.wgsl", name);
        println!("cargo:rerun-if-changed={}", source_path);

        let source = fs::read_to_string(&source_path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", source_path, e));

        let words = compile_wgsl(name, &source);
        let bytes: Vec<u8> = words.iter().flat_map(|word| word.to_le_bytes()).collect();

        let dest = Path::new(&out_dir).join(format!("{}.spv", name));
        fs::write(&dest, bytes).unwrap_or_else(|e| panic!("Failed to write {:?}: {}", dest, e));
    }
}

fn compile_wgsl(name: &str, source: &str) -> Vec<u32> {
    let module = naga::front::wgsl::parse_str(source).unwrap_or_else(|e| {
        panic!("WGSL parse error in {}:\n{}", name, e.emit_to_string(source))
    });

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    let info = validator
        .validate(&module)
        .unwrap_or_else(|e| panic!("Shader validation error in {}: {:?}", name, e));

    // Clip space is already Vulkan's (Y down, depth 0..1), so no Y flip
    let options = naga::back::spv::Options {
        flags: naga::back::spv::WriterFlags::LABEL_VARYINGS,
        ..Default::default()
    };

    naga::back::spv::write_vec(&module, &info, &options, None)
        .unwrap_or_else(|e| panic!("SPIR-V generation error in {}: {:?}", name, e))
}
