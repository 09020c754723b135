//! The JSON shapes exchanged with the relay over one WebSocket connection,
//! mirroring the relay's own multiplexed request/response framing.

use common::{Envelope, SharedKey};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub(crate) enum Action {
    Init { user_id: String },
    Register { user_id: String, bundle: SharedKey },
    GetKeys { name: String },
    Send {
        #[serde(flatten)]
        envelope: Envelope,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum RelayResponse {
    Ack,
    Keys { bundle: SharedKey },
    Error { message: String },
}
