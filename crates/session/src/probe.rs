//! Detecting whether the browser session is signed in.
//!
//! The site gives no machine-readable signal, so detection is a heuristic
//! over whatever the page exposes. Keeping it behind [`AuthProbe`] means the
//! heuristic can change without touching the sign-in flow.

use crate::error::{ErrorKind, Result};
use chromiumoxide::Page;
use exn::ResultExt;
use serde::Deserialize;

const SIGNED_OUT_TITLE: &str = "Sign In";
const SIGNED_IN_TITLE: &str = "Update your settings";
const SIGNED_IN_MARKER: &str = "body.logged-in";
const SESSION_COOKIE: &str = "letterboxd.user.CURRENT";

/// Strategy for deciding if the current page belongs to a signed-in session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AuthProbe {
    /// Match (case-insensitively) against the page title.
    Title {
        #[serde(default = "default_signed_in_title")]
        signed_in: String,
        #[serde(default = "default_signed_out_title")]
        signed_out: String,
    },
    /// Signed in when an element matching `selector` exists.
    Dom {
        #[serde(default = "default_marker")]
        selector: String,
    },
    /// Signed in when the browser holds a cookie called `name`.
    Cookie {
        #[serde(default = "default_cookie")]
        name: String,
    },
}
impl Default for AuthProbe {
    fn default() -> Self {
        Self::Title {
            signed_in: default_signed_in_title(),
            signed_out: default_signed_out_title(),
        }
    }
}
impl AuthProbe {
    pub async fn is_authenticated(&self, page: &Page) -> Result<bool> {
        let authenticated = match self {
            Self::Title { signed_in, signed_out } => {
                let title = page.get_title().await.or_raise(|| ErrorKind::Automation)?.unwrap_or_default();
                tracing::debug!(title = %title, "Checking page title for sign-in state");
                title_signals_signed_in(&title, signed_in, signed_out)
            },
            Self::Dom { selector } => page.find_element(selector.as_str()).await.is_ok(),
            Self::Cookie { name } => page
                .get_cookies()
                .await
                .or_raise(|| ErrorKind::Automation)?
                .iter()
                .any(|cookie| cookie.name == *name),
        };
        Ok(authenticated)
    }
}

/// A title only counts as signed in when it shows the signed-in marker and
/// nothing that looks like a sign-in prompt.
fn title_signals_signed_in(title: &str, signed_in: &str, signed_out: &str) -> bool {
    let title = title.to_lowercase();
    title.contains(&signed_in.to_lowercase()) && !title.contains(&signed_out.to_lowercase())
}

fn default_signed_in_title() -> String {
    SIGNED_IN_TITLE.to_string()
}

fn default_signed_out_title() -> String {
    SIGNED_OUT_TITLE.to_string()
}

fn default_marker() -> String {
    SIGNED_IN_MARKER.to_string()
}

fn default_cookie() -> String {
    SESSION_COOKIE.to_string()
}
