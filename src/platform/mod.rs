pub mod opener;

pub use opener::{RecordingUrlOpener, SystemUrlOpener, UrlOpener, validate_artifact_url};

/// Install the ring crypto provider for rustls.
///
/// reqwest and the realtime websocket both link rustls; without an explicit
/// process-level provider rustls cannot pick one. Safe to call repeatedly.
pub fn install_crypto_provider() {
    if rustls::crypto::CryptoProvider::get_default().is_none()
        && let Err(e) = rustls::crypto::ring::default_provider().install_default()
    {
        tracing::debug!("crypto provider already installed: {e:?}");
    }
}
