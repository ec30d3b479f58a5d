use crate::models::caip::{AccountId, AssetId};

/// Read view of the wallet-connection collaborator.
pub trait WalletConnection: Send + Sync {
    fn is_connected(&self) -> bool;
}

/// Sink for UI intents — the modal / connection-prompt collaborator.
pub trait IntentDispatcher: Send + Sync {
    fn dispatch(&self, intent: UiIntent);
}

/// The two affordances offered on an asset row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetAction {
    Send,
    Receive,
}

/// What an activated affordance asks the UI shell to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiIntent {
    OpenSendModal {
        asset_id: AssetId,
        account_id: Option<AccountId>,
    },
    OpenReceiveModal {
        asset_id: AssetId,
        account_id: Option<AccountId>,
    },
    /// No wallet connected — prompt for connection instead of opening
    /// the requested modal.
    RequestWalletConnection,
}

/// Dispatches send/receive intents, gated on wallet-connection state.
/// Holds no state of its own.
pub struct AssetActionService;

impl AssetActionService {
    pub fn new() -> Self {
        Self
    }

    /// Activate an affordance for an asset (optionally scoped to one
    /// account). Connected wallets get the matching modal, pre-populated;
    /// everyone else gets the connection prompt.
    ///
    /// The dispatched intent is also returned for callers that want it.
    pub fn activate(
        &self,
        wallet: &dyn WalletConnection,
        dispatcher: &dyn IntentDispatcher,
        action: AssetAction,
        asset_id: &AssetId,
        account_id: Option<&AccountId>,
    ) -> UiIntent {
        let intent = if wallet.is_connected() {
            match action {
                AssetAction::Send => UiIntent::OpenSendModal {
                    asset_id: asset_id.clone(),
                    account_id: account_id.cloned(),
                },
                AssetAction::Receive => UiIntent::OpenReceiveModal {
                    asset_id: asset_id.clone(),
                    account_id: account_id.cloned(),
                },
            }
        } else {
            UiIntent::RequestWalletConnection
        };

        dispatcher.dispatch(intent.clone());
        intent
    }
}

impl Default for AssetActionService {
    fn default() -> Self {
        Self::new()
    }
}
