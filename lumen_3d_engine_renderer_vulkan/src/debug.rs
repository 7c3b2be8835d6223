/// Vulkan Debug Messenger - routes validation layer messages into the engine logger
///
/// Only compiled with the `vulkan-validation` feature. Messages keep the
/// validation layer's severity, are tagged with their category and message
/// id, and identical messages are counted so repeats are visible.

use ash::vk;
use colored::*;
use lumen_3d_engine::lumen3d::Engine;
use lumen_3d_engine::lumen3d::log::LogSeverity;
use rustc_hash::FxHashMap;
use std::borrow::Cow;
use std::ffi::CStr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

/// Log source of every routed validation message
pub const VALIDATION_SOURCE: &str = "lumen3d::vulkan::validation";

/// Set while a messenger is live; the callback drops messages otherwise
static ROUTING_ENABLED: AtomicBool = AtomicBool::new(false);

/// Global validation statistics (thread-safe atomic counters)
static VALIDATION_STATS: ValidationStatsTracker = ValidationStatsTracker::new();

/// Global message tracker for grouping identical messages
static MESSAGE_TRACKER: Mutex<Option<MessageTracker>> = Mutex::new(None);

/// Validation message counts per severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationStats {
    pub errors: u32,
    pub warnings: u32,
    pub info: u32,
    pub verbose: u32,
}

impl ValidationStats {
    pub fn total(&self) -> u32 {
        self.errors + self.warnings + self.info + self.verbose
    }
}

/// Thread-safe validation statistics tracker
struct ValidationStatsTracker {
    errors: AtomicU32,
    warnings: AtomicU32,
    info: AtomicU32,
    verbose: AtomicU32,
}

impl ValidationStatsTracker {
    const fn new() -> Self {
        Self {
            errors: AtomicU32::new(0),
            warnings: AtomicU32::new(0),
            info: AtomicU32::new(0),
            verbose: AtomicU32::new(0),
        }
    }

    fn increment(&self, severity: LogSeverity) {
        let counter = match severity {
            LogSeverity::Error => &self.errors,
            LogSeverity::Warn => &self.warnings,
            LogSeverity::Info | LogSeverity::Debug => &self.info,
            LogSeverity::Trace => &self.verbose,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn get_stats(&self) -> ValidationStats {
        ValidationStats {
            errors: self.errors.load(Ordering::Relaxed),
            warnings: self.warnings.load(Ordering::Relaxed),
            info: self.info.load(Ordering::Relaxed),
            verbose: self.verbose.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.errors.store(0, Ordering::Relaxed);
        self.warnings.store(0, Ordering::Relaxed);
        self.info.store(0, Ordering::Relaxed);
        self.verbose.store(0, Ordering::Relaxed);
    }
}

/// Message tracker for grouping identical messages
#[derive(Default)]
struct MessageTracker {
    messages: FxHashMap<String, u32>,
}

impl MessageTracker {
    fn track_message(&mut self, message: &str) -> u32 {
        let count = self.messages.entry(message.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    fn repeated(&self) -> usize {
        self.messages.values().filter(|&&count| count > 1).count()
    }
}

/// Start routing messages; resets statistics and the repeat tracker
pub fn init_debug_config() {
    VALIDATION_STATS.reset();
    if let Ok(mut tracker) = MESSAGE_TRACKER.lock() {
        *tracker = Some(MessageTracker::default());
    }
    ROUTING_ENABLED.store(true, Ordering::Release);
}

/// Stop routing messages (called before the messenger is destroyed)
pub fn cleanup_debug_config() {
    ROUTING_ENABLED.store(false, Ordering::Release);
}

/// Get current validation statistics
pub fn get_validation_stats() -> ValidationStats {
    VALIDATION_STATS.get_stats()
}

/// Print validation statistics report
pub fn print_validation_stats_report() {
    let stats = get_validation_stats();

    if stats.total() == 0 {
        println!("\n{}", "✓ No validation messages".green().bold());
        return;
    }

    println!("\n{}", "=== Validation Statistics Report ===".bright_blue().bold());

    if stats.errors > 0 {
        println!("  {} {}", "Errors:".red().bold(), stats.errors);
    }
    if stats.warnings > 0 {
        println!("  {} {}", "Warnings:".yellow().bold(), stats.warnings);
    }
    if stats.info > 0 {
        println!("  {} {}", "Info:".cyan(), stats.info);
    }
    if stats.verbose > 0 {
        println!("  {} {}", "Verbose:".bright_black(), stats.verbose);
    }

    println!("  {} {}", "Total:".white().bold(), stats.total());

    if let Ok(tracker) = MESSAGE_TRACKER.lock() {
        let repeated = tracker.as_ref().map(MessageTracker::repeated).unwrap_or(0);
        if repeated > 0 {
            println!("\n  {} {} message(s) appeared multiple times", "ℹ".cyan(), repeated);
        }
    }

    println!("{}\n", "====================================".bright_blue().bold());
}

/// Engine log severity of a validation message
pub fn message_severity(flags: vk::DebugUtilsMessageSeverityFlagsEXT) -> LogSeverity {
    if flags.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        LogSeverity::Error
    } else if flags.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        LogSeverity::Warn
    } else if flags.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        LogSeverity::Debug
    } else {
        LogSeverity::Trace
    }
}

pub fn message_type_label(flags: vk::DebugUtilsMessageTypeFlagsEXT) -> &'static str {
    if flags.contains(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION) {
        "Validation"
    } else if flags.contains(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE) {
        "Performance"
    } else {
        "General"
    }
}

/// Record a message and build its log line
fn route_message(severity: LogSeverity, type_label: &str, message_id: &str, message: &str) -> String {
    VALIDATION_STATS.increment(severity);

    let occurrence_count = match MESSAGE_TRACKER.lock() {
        Ok(mut tracker) => tracker.get_or_insert_with(MessageTracker::default).track_message(message),
        Err(_) => 1,
    };

    if occurrence_count > 1 {
        format!("[{}] {} [x{}]: {}", type_label, message_id, occurrence_count, message)
    } else {
        format!("[{}] {}: {}", type_label, message_id, message)
    }
}

/// Vulkan debug messenger callback
///
/// Called by the validation layers on any thread.
pub unsafe extern "system" fn vulkan_debug_callback(
    message_severity_flags: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    _user_data: *mut std::os::raw::c_void,
) -> vk::Bool32 {
    if !ROUTING_ENABLED.load(Ordering::Acquire) || p_callback_data.is_null() {
        return vk::FALSE;
    }

    let callback_data = unsafe { *p_callback_data };
    let message_id = if callback_data.p_message_id_name.is_null() {
        Cow::Borrowed("Unknown")
    } else {
        unsafe { CStr::from_ptr(callback_data.p_message_id_name) }.to_string_lossy()
    };
    let message = if callback_data.p_message.is_null() {
        Cow::Borrowed("No message")
    } else {
        unsafe { CStr::from_ptr(callback_data.p_message) }.to_string_lossy()
    };

    let severity = message_severity(message_severity_flags);
    let line = route_message(severity, message_type_label(message_type), &message_id, &message);
    Engine::log(severity, VALIDATION_SOURCE, line);

    vk::FALSE // Don't abort Vulkan execution
}

#[cfg(test)]
#[path = "debug_tests.rs"]
mod tests;
