use crate::domain::model::ConnectivityState;
use crate::domain::ports::{StatusColor, StatusLabel};

pub const LABEL_CHECKING: StatusLabel = StatusLabel {
    text: "Checking connection...",
    color: StatusColor::Neutral,
};

pub const LABEL_CONNECTED: StatusLabel = StatusLabel {
    text: "Connected",
    color: StatusColor::Green,
};

pub const LABEL_DISCONNECTED: StatusLabel = StatusLabel {
    text: "Connection failed, please connect to the internet",
    color: StatusColor::Red,
};

pub fn status_label(state: ConnectivityState) -> StatusLabel {
    match state {
        ConnectivityState::Checking => LABEL_CHECKING,
        ConnectivityState::Connected => LABEL_CONNECTED,
        ConnectivityState::Disconnected => LABEL_DISCONNECTED,
    }
}

/// Decides whether the Translate action may be triggered.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionGate {
    connectivity: ConnectivityState,
    busy: bool,
}

impl ActionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connectivity(&self) -> ConnectivityState {
        self.connectivity
    }

    pub fn set_connectivity(&mut self, state: ConnectivityState) {
        self.connectivity = state;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    pub fn translate_enabled(&self) -> bool {
        self.connectivity.is_connected() && !self.busy
    }
}
