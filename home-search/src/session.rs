use tokio_util::sync::CancellationToken;

/// Which input device drove the latest highlight change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationSource {
    Keyboard,
    #[default]
    Pointer,
}

/// Overlay mode. Navigation source only exists while open, so a keyboard
/// highlight on a closed overlay cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overlay {
    #[default]
    Closed,
    Open { navigation: NavigationSource },
}

/// Logical state of one search interaction, owned by the mounted widget.
#[derive(Debug, Default)]
pub struct SearchSession {
    pub term: String,
    pub overlay: Overlay,
    active_request: Option<CancellationToken>,
}

impl SearchSession {
    pub fn is_open(&self) -> bool {
        matches!(self.overlay, Overlay::Open { .. })
    }

    pub fn navigation(&self) -> Option<NavigationSource> {
        match self.overlay {
            Overlay::Open { navigation } => Some(navigation),
            Overlay::Closed => None,
        }
    }

    pub fn open(&mut self) {
        if !self.is_open() {
            self.overlay = Overlay::Open {
                navigation: NavigationSource::default(),
            };
        }
    }

    pub fn close(&mut self) {
        self.overlay = Overlay::Closed;
    }

    /// Records the navigation source; ignored while closed.
    pub fn set_navigation(&mut self, source: NavigationSource) {
        if let Overlay::Open { navigation } = &mut self.overlay {
            *navigation = source;
        }
    }

    pub fn active_request(&self) -> Option<&CancellationToken> {
        self.active_request.as_ref()
    }

    /// Installs `token` as the live request, cancelling the previous one
    /// first.
    pub fn replace_active_request(&mut self, token: CancellationToken) {
        if let Some(previous) = self.active_request.replace(token) {
            previous.cancel();
        }
    }

    pub fn cancel_active_request(&mut self) {
        if let Some(token) = self.active_request.take() {
            token.cancel();
        }
    }
}
