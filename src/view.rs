//! Presentation derived from portal state

use serde::Serialize;

use crate::list_sync::ListState;
use crate::program::GifEntry;
use crate::session::WalletSession;

/// Which of the page's presentations applies
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum PortalView {
    Disconnected,
    Loading,
    NeedsInitialization,
    Gallery { entries: Vec<GifEntry>, total: u64 },
}

impl PortalView {
    pub fn derive(session: &WalletSession, list: &ListState, total: u64) -> Self {
        if !session.is_connected() {
            return PortalView::Disconnected;
        }
        match list {
            ListState::NotLoaded => PortalView::Loading,
            ListState::Uninitialized => PortalView::NeedsInitialization,
            ListState::Loaded(entries) => PortalView::Gallery {
                entries: entries.clone(),
                total,
            },
        }
    }

    /// Text rendering for a terminal
    pub fn render(&self) -> Vec<String> {
        match self {
            PortalView::Disconnected => vec!["[ Connect to Wallet ]".to_string()],
            PortalView::Loading => vec!["Fetching GIF list...".to_string()],
            PortalView::NeedsInitialization => {
                vec!["[ Do One-Time Initialization For GIF Program Account ]".to_string()]
            }
            PortalView::Gallery { entries, total } => {
                let mut lines = Vec::with_capacity(entries.len() + 1);
                lines.push(format!("{} GIFs ({} submitted)", entries.len(), total));
                lines.extend(entries.iter().enumerate().map(|(i, entry)| {
                    format!("{:>3}. {} (submitted by {})", i + 1, entry.link, entry.submitter_name)
                }));
                lines
            }
        }
    }
}
