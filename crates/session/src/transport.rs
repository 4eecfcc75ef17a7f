//! Carrying the export out of the browser.
//!
//! The export endpoint only answers to the browser's signed-in cookies, so the
//! request has to be made from inside the page. Binary data can't cross the
//! DevTools boundary as-is, so the page reads the body as a base64 `data:` URL
//! and hands back JSON; [`TransportPayload::into_download`] turns it back into
//! bytes on this side.

use crate::ExportDownload;
use crate::error::{ErrorKind, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use exn::{OptionExt, ResultExt};
use serde::Deserialize;

const FETCH_AS_DATA_URL: &str = r#"
async function () {
    const response = await window.fetch(__EXPORT_URL__, { credentials: 'include' });
    const payload = {
        ok: response.ok,
        status: response.status,
        statusText: response.statusText,
        mime: response.headers.get('Content-Type'),
        dataUrl: null,
    };
    if (!response.ok) {
        return payload;
    }
    const blob = await response.blob();
    payload.dataUrl = await new Promise((resolve, reject) => {
        const reader = new FileReader();
        reader.addEventListener('loadend', () => resolve(reader.result));
        reader.addEventListener('error', () => reject(reader.error));
        reader.readAsDataURL(blob);
    });
    return payload;
}
"#;

/// JavaScript function declaration that fetches `url` inside the page and
/// resolves to a [`TransportPayload`].
pub(crate) fn fetch_function(url: &str) -> Result<String> {
    let url = serde_json::to_string(url).or_raise(|| ErrorKind::Transport)?;
    Ok(FETCH_AS_DATA_URL.replace("__EXPORT_URL__", &url))
}

/// What the in-page fetch hands back across the automation boundary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportPayload {
    pub ok: bool,
    pub status: u16,
    #[serde(default)]
    pub status_text: String,
    pub mime: Option<String>,
    pub data_url: Option<String>,
}
impl TransportPayload {
    /// Decode the payload into the export bytes.
    ///
    /// Fails with [`ErrorKind::ExportRejected`] if the response wasn't OK, or
    /// [`ErrorKind::Transport`] if the data URL is missing or isn't base64.
    pub fn into_download(self) -> Result<ExportDownload> {
        if !self.ok {
            exn::bail!(ErrorKind::ExportRejected { status: self.status, status_text: self.status_text });
        }
        let data_url = self.data_url.ok_or_raise(|| ErrorKind::Transport)?;
        let (header, data) = data_url.split_once(',').ok_or_raise(|| ErrorKind::Transport)?;
        let header = header.strip_prefix("data:").ok_or_raise(|| ErrorKind::Transport)?;
        let Some(media_type) = header.strip_suffix(";base64") else {
            exn::bail!(ErrorKind::Transport);
        };
        let bytes = STANDARD.decode(data).or_raise(|| ErrorKind::Transport)?;
        let mime_type = self.mime.filter(|m| !m.is_empty()).or_else(|| Some(media_type.to_string()).filter(|m| !m.is_empty()));
        Ok(ExportDownload { bytes, mime_type })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(data_url: Option<&str>, mime: Option<&str>) -> TransportPayload {
        TransportPayload {
            ok: true,
            status: 200,
            status_text: "OK".to_string(),
            mime: mime.map(str::to_string),
            data_url: data_url.map(str::to_string),
        }
    }

    #[test]
    fn test_decode_data_url() {
        let download = payload(Some("data:application/zip;base64,UEsFBgAAAAAAAAAAAAAAAAAAAAAAAA=="), Some("application/zip"))
            .into_download()
            .unwrap();
        assert_eq!(&download.bytes[..4], &[0x50, 0x4B, 0x05, 0x06]);
        assert_eq!(download.bytes.len(), 22);
        assert_eq!(download.mime_type.as_deref(), Some("application/zip"));
    }

    #[test]
    fn test_mime_falls_back_to_data_url() {
        let download = payload(Some("data:application/octet-stream;base64,AAEC"), None).into_download().unwrap();
        assert_eq!(download.bytes, [0x00, 0x01, 0x02]);
        assert_eq!(download.mime_type.as_deref(), Some("application/octet-stream"));
    }

    #[test]
    fn test_not_ok_is_rejected() {
        let rejected = TransportPayload { ok: false, status: 403, status_text: "Forbidden".to_string(), mime: None, data_url: None };
        let err = rejected.into_download().unwrap_err();
        assert!(matches!(&*err, ErrorKind::ExportRejected { status: 403, status_text } if status_text == "Forbidden"));
    }

    #[test]
    fn test_malformed_data_urls() {
        for url in [None, Some("no comma"), Some("application/zip;base64,AAEC"), Some("data:application/zip,AAEC"), Some("data:;base64,!!!")] {
            let err = payload(url, None).into_download().unwrap_err();
            assert!(matches!(*err, ErrorKind::Transport), "{url:?}");
        }
    }

    #[test]
    fn test_deserialize_from_page() {
        let json = r#"{"ok":true,"status":200,"statusText":"OK","mime":"application/zip","dataUrl":"data:application/zip;base64,AAEC"}"#;
        let payload: TransportPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.into_download().unwrap().bytes, [0x00, 0x01, 0x02]);
    }

    #[test]
    fn test_fetch_function_embeds_url() {
        let js = fetch_function("https://letterboxd.com/data/export/").unwrap();
        assert!(js.contains(r#"window.fetch("https://letterboxd.com/data/export/""#));
        assert!(!js.contains("__EXPORT_URL__"));
    }
}
