//! Which report image, if any, is shown enlarged.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnlargedResource {
    pub url: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalViewer {
    current: Option<EnlargedResource>,
}

impl ModalViewer {
    /// Opening replaces whatever was enlarged before.
    pub fn open(&mut self, url: impl Into<String>, label: impl Into<String>) {
        self.current = Some(EnlargedResource {
            url: url.into(),
            label: label.into(),
        });
    }

    pub fn close(&mut self) {
        self.current = None;
    }

    /// Escape dismisses the overlay; returns whether the key was consumed.
    pub fn close_on_key(&mut self, key: &str) -> bool {
        if key == "Escape" && self.is_open() {
            self.close();
            return true;
        }
        false
    }

    pub fn current(&self) -> Option<&EnlargedResource> {
        self.current.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }
}
