/// Per-image ownership table of a presentation chain

/// Records which frame slot last submitted work into each presentable image
///
/// Image indices come from the presentation engine and are unrelated to frame
/// slots, so two slots can end up targeting the same image. Before submitting
/// into an image the chain looks up its owner and waits on that slot's fence.
#[derive(Debug, Clone)]
pub struct ImagesInFlight {
    owners: Vec<Option<usize>>,
}

impl ImagesInFlight {
    /// Table for `image_count` images, all unowned
    pub fn new(image_count: usize) -> Self {
        Self {
            owners: vec![None; image_count],
        }
    }

    /// Frame slot whose submission last targeted `image_index`
    ///
    /// # Panics
    ///
    /// Panics if `image_index` is out of range.
    pub fn owner(&self, image_index: u32) -> Option<usize> {
        self.owners[image_index as usize]
    }

    /// Mark `frame_index` as the new owner of `image_index`
    ///
    /// Returns the previous owner.
    pub fn claim(&mut self, image_index: u32, frame_index: usize) -> Option<usize> {
        self.owners[image_index as usize].replace(frame_index)
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

#[cfg(test)]
#[path = "images_in_flight_tests.rs"]
mod tests;
