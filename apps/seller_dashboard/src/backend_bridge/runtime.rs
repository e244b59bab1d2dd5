//! Runtime bridge between UI command queue and backend event intake.
//!
//! The worker owns a multi-threaded tokio runtime. Every command runs as its
//! own task so a slow request never holds up the ones queued after it.

use std::{sync::Arc, thread};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use dashboard_core::{execute, RestGateway, SellerStore, Settings};
use tracing::{error, info, warn};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{Thumbnail, UiError, UiErrorContext, UiEvent};

/// Longest edge of a decoded product thumbnail, in pixels.
pub const THUMBNAIL_EDGE: u32 = 320;

pub fn launch(settings: Settings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                send_event(
                    &ui_tx,
                    UiEvent::Error(UiError::from_message(
                        UiErrorContext::BackendStartup,
                        format!("backend worker startup failure: failed to build runtime: {err}"),
                    )),
                );
                error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let gateway = match RestGateway::new(&settings) {
                Ok(gateway) => gateway,
                Err(err) => {
                    error!("failed to build data gateway: {err}");
                    send_event(
                        &ui_tx,
                        UiEvent::Error(UiError::from_dashboard(
                            UiErrorContext::BackendStartup,
                            &err,
                        )),
                    );
                    return;
                }
            };
            let store = SellerStore::new(Arc::new(gateway));
            let images = match reqwest::Client::builder()
                .timeout(settings.request_timeout)
                .build()
            {
                Ok(http) => ImageFetcher {
                    http,
                    max_bytes: settings.image_max_bytes,
                },
                Err(err) => {
                    error!("failed to build image client: {err}");
                    send_event(
                        &ui_tx,
                        UiEvent::Error(UiError::from_message(
                            UiErrorContext::BackendStartup,
                            format!("backend worker startup failure: {err}"),
                        )),
                    );
                    return;
                }
            };
            info!(endpoint = %settings.endpoint_url, "backend worker ready");

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::Dashboard(command) => {
                        let store = store.clone();
                        let ui_tx = ui_tx.clone();
                        tokio::spawn(async move {
                            let name = command.name();
                            info!(command = name, "backend: running command");
                            let completion = execute(&store, command).await;
                            send_event(&ui_tx, UiEvent::Completed(completion));
                        });
                    }
                    BackendCommand::FetchImage { url } => {
                        let images = images.clone();
                        let ui_tx = ui_tx.clone();
                        tokio::spawn(async move {
                            let event = match images.fetch(&url).await {
                                Ok(image) => UiEvent::ImageLoaded { url, image },
                                Err(reason) => UiEvent::ImageFailed {
                                    url,
                                    error: UiError::from_message(UiErrorContext::ImageLoad, reason),
                                },
                            };
                            send_event(&ui_tx, event);
                        });
                    }
                }
            }
            info!("ui command channel closed; backend worker exiting");
        });
    });
}

/// Gateway completions must reach the reducer, so they wait for room in the
/// queue. Everything else is dropped when the UI falls behind.
fn send_event(ui_tx: &Sender<UiEvent>, event: UiEvent) {
    if matches!(event, UiEvent::Completed(_)) {
        if ui_tx.send(event).is_err() {
            warn!("ui event channel closed; dropping completion");
        }
        return;
    }
    match ui_tx.try_send(event) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => warn!("ui event queue full; dropping backend event"),
        Err(TrySendError::Disconnected(_)) => {}
    }
}

#[derive(Clone)]
struct ImageFetcher {
    http: reqwest::Client,
    max_bytes: u64,
}

impl ImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Thumbnail, String> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| err.to_string())?;
        if let Some(len) = response.content_length() {
            check_size(len, self.max_bytes)?;
        }
        let bytes = response.bytes().await.map_err(|err| err.to_string())?;
        check_size(bytes.len() as u64, self.max_bytes)?;
        decode_thumbnail(&bytes)
    }
}

fn check_size(len: u64, max_bytes: u64) -> Result<(), String> {
    if len > max_bytes {
        return Err(format!("image is {len} bytes, limit is {max_bytes}"));
    }
    Ok(())
}

pub fn decode_thumbnail(bytes: &[u8]) -> Result<Thumbnail, String> {
    let dynamic = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    let resized = if dynamic.width() > THUMBNAIL_EDGE || dynamic.height() > THUMBNAIL_EDGE {
        dynamic.thumbnail(THUMBNAIL_EDGE, THUMBNAIL_EDGE).to_rgba8()
    } else {
        dynamic.to_rgba8()
    };
    Ok(Thumbnail {
        width: resized.width() as usize,
        height: resized.height() as usize,
        rgba: resized.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 120, 40, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png)
            .expect("encode png");
        out.into_inner()
    }

    #[test]
    fn thumbnails_keep_aspect_ratio_within_edge() {
        let thumb = decode_thumbnail(&png_bytes(800, 400)).expect("decode");
        assert_eq!((thumb.width, thumb.height), (320, 160));
        assert_eq!(thumb.rgba.len(), 320 * 160 * 4);
    }

    #[test]
    fn small_images_are_not_upscaled() {
        let thumb = decode_thumbnail(&png_bytes(40, 30)).expect("decode");
        assert_eq!((thumb.width, thumb.height), (40, 30));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(decode_thumbnail(b"not an image").is_err());
    }

    #[test]
    fn oversized_downloads_are_rejected() {
        assert!(check_size(10, 10).is_ok());
        assert_eq!(
            check_size(11, 10).unwrap_err(),
            "image is 11 bytes, limit is 10"
        );
    }
}
