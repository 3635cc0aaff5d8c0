use tokio::sync::broadcast::{self, Sender};

use crate::client::events::AuthEvent;


const BUFFER_SIZE: usize = 16;
pub fn run() -> Sender<AuthEvent> {
    let (event_sender, _) = broadcast::channel(BUFFER_SIZE);
    event_sender
}
