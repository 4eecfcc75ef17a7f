//! Headless Chrome export session.

use crate::error::{ErrorKind, Result};
use crate::transport::{TransportPayload, fetch_function};
use crate::{AuthProbe, EXPORT_URL, ExportDownload, ExportSource, Progress, SETTINGS_URL, SessionCredential, SessionEvent};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::EventFrameStartedLoading;
use chromiumoxide::cdp::js_protocol::runtime::CallFunctionOnParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use exn::ResultExt;
use futures::{Stream, StreamExt};
use std::future::{Future, ready};
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::instrument;

const SIGNIN_FORM: &str = "#signin-form";
const SIGNIN_USERNAME: &str = "#signin-username";
const SIGNIN_PASSWORD: &str = "#signin-password";

/// How the browser is launched and how long it is given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserOptions {
    /// Executable path or name; discovered on `PATH` when unset.
    pub executable: Option<PathBuf>,
    pub headless: bool,
    /// Run with Chrome's sandbox. Off by default, as containers rarely allow it.
    pub sandbox: bool,
    /// Pause between retrieving the archive and closing the browser.
    pub settle_delay: Duration,
    /// Upper bound on every single page navigation.
    pub navigation_timeout: Duration,
}
impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            executable: None,
            headless: true,
            sandbox: false,
            settle_delay: Duration::from_millis(2000),
            navigation_timeout: Duration::from_secs(30),
        }
    }
}

/// Signs in to Letterboxd in a fresh browser and downloads the data export.
///
/// Every session launches its own browser with an empty profile, and the
/// browser is shut down before [`fetch_export`](ExportSource::fetch_export)
/// returns, whether it succeeded or not.
#[derive(Debug, Clone, Default)]
pub struct BrowserSession {
    options: BrowserOptions,
    probe: AuthProbe,
}
impl BrowserSession {
    pub fn new(options: BrowserOptions, probe: AuthProbe) -> Self {
        Self { options, probe }
    }

    fn config(&self) -> Result<BrowserConfig> {
        let executable = crate::chrome::discover(self.options.executable.as_deref())?;
        let mut builder = BrowserConfig::builder()
            .chrome_executable(executable)
            .request_timeout(self.options.navigation_timeout);
        if !self.options.sandbox {
            builder = builder.no_sandbox().arg("--disable-setuid-sandbox");
        }
        if !self.options.headless {
            builder = builder.with_head();
        }
        builder.build().map_err(|err| exn::Exn::from(ErrorKind::BrowserConfig(err)))
    }

    async fn launch(&self) -> Result<(Browser, JoinHandle<()>)> {
        let config = self.config()?;
        let (browser, mut handler) = Browser::launch(config).await.or_raise(|| ErrorKind::Launch)?;
        // The CDP connection only makes progress while its handler is polled.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    tracing::trace!(error = %err, "Browser connection event failed");
                }
            }
        });
        Ok((browser, handler))
    }

    /// Bound a navigation by the configured timeout.
    async fn navigate<T, E>(&self, navigation: impl Future<Output = std::result::Result<T, E>>) -> Result<T>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        match tokio::time::timeout(self.options.navigation_timeout, navigation).await {
            Ok(result) => result.or_raise(|| ErrorKind::Navigation),
            Err(_) => exn::bail!(ErrorKind::NavigationTimeout),
        }
    }

    async fn sign_in(&self, page: &Page, credential: &SessionCredential) -> Result<()> {
        page.find_element(SIGNIN_FORM)
            .await
            .or_raise(|| ErrorKind::LoginFormMissing(SIGNIN_FORM))?;
        let username = page
            .find_element(SIGNIN_USERNAME)
            .await
            .or_raise(|| ErrorKind::LoginFormMissing(SIGNIN_USERNAME))?;
        let password = page
            .find_element(SIGNIN_PASSWORD)
            .await
            .or_raise(|| ErrorKind::LoginFormMissing(SIGNIN_PASSWORD))?;
        username.click().await.or_raise(|| ErrorKind::Automation)?;
        username.type_str(credential.username()).await.or_raise(|| ErrorKind::Automation)?;
        password.click().await.or_raise(|| ErrorKind::Automation)?;
        password.type_str(credential.password()).await.or_raise(|| ErrorKind::Automation)?;
        // Subscribe before submitting: the sign-in page counts as loaded
        // until the form POST starts, and a wait issued before then returns
        // straight away.
        let main_frame = page.mainframe().await.or_raise(|| ErrorKind::Automation)?;
        let loading = page
            .event_listener::<EventFrameStartedLoading>()
            .await
            .or_raise(|| ErrorKind::Automation)?
            .filter(move |event| ready(main_frame.as_ref().is_none_or(|frame| *frame == event.frame_id)));
        // Submit the way a person would, from the keyboard.
        password.press_key("Enter").await.or_raise(|| ErrorKind::Automation)?;
        self.navigate(navigation_after(loading, page.wait_for_navigation())).await?;
        Ok(())
    }

    async fn download(&self, page: &Page) -> Result<ExportDownload> {
        let function = CallFunctionOnParams::builder()
            .function_declaration(fetch_function(EXPORT_URL)?)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(|err| exn::Exn::from(ErrorKind::BrowserConfig(err)))?;
        let payload: TransportPayload = page
            .evaluate_function(function)
            .await
            .or_raise(|| ErrorKind::Automation)?
            .into_value()
            .or_raise(|| ErrorKind::Transport)?;
        tracing::debug!(status = payload.status, mime = ?payload.mime, "Export endpoint responded");
        payload.into_download()
    }

    async fn drive(&self, browser: &Browser, credential: &SessionCredential, progress: Progress<'_>) -> Result<ExportDownload> {
        let page = self.navigate(browser.new_page(SETTINGS_URL)).await?;
        progress(SessionEvent::Authenticating);
        if self.probe.is_authenticated(&page).await? {
            tracing::info!("Browser session is already signed in");
        } else {
            tracing::info!(username = %credential.username(), "Signing in");
            self.sign_in(&page, credential).await?;
            if !self.probe.is_authenticated(&page).await? {
                exn::bail!(ErrorKind::AuthenticationFailed);
            }
            tracing::info!("Signed in");
        }
        progress(SessionEvent::Authenticated);

        tracing::info!("Downloading archive");
        progress(SessionEvent::ExportTriggered);
        let download = self.download(&page).await?;
        tracing::info!(size = download.bytes.len(), mime = ?download.mime_type, "Archive downloaded");
        progress(SessionEvent::ArchiveRetrieved);
        // Give anything the page still has in flight a moment before closing.
        tokio::time::sleep(self.options.settle_delay).await;
        Ok(download)
    }

    async fn shutdown(mut browser: Browser, handler: JoinHandle<()>) {
        if let Err(err) = browser.close().await {
            tracing::warn!(error = %err, "Failed to close browser cleanly; killing it");
            if let Some(Err(err)) = browser.kill().await {
                tracing::warn!(error = %err, "Failed to kill browser process");
            }
        } else if let Err(err) = browser.wait().await {
            tracing::warn!(error = %err, "Failed waiting for browser to exit");
        }
        handler.abort();
    }
}

/// Await `navigation` only once `started` has signalled that a new page load
/// began (or has closed, in which case there is nothing left to wait for).
async fn navigation_after<S, F, T, E>(started: S, navigation: F) -> std::result::Result<T, E>
where
    S: Stream,
    F: Future<Output = std::result::Result<T, E>>,
{
    let mut started = std::pin::pin!(started);
    started.next().await;
    navigation.await
}

#[async_trait]
impl ExportSource for BrowserSession {
    #[instrument(skip_all, fields(username = %credential.username(), headless = self.options.headless))]
    async fn fetch_export(&self, credential: &SessionCredential, progress: Progress<'_>) -> Result<ExportDownload> {
        let (browser, handler) = self.launch().await?;
        let result = self.drive(&browser, credential, progress).await;
        Self::shutdown(browser, handler).await;
        result
    }
}
