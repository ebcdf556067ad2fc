//! Image Upload
//!
//! Reads a picked file and re-encodes it through a canvas so only a small
//! JPEG data URL gets stored on the item.

use js_sys::Promise;
use ledger_core::services::scaled_dimensions;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, File, FileReader, HtmlCanvasElement, HtmlImageElement};

const JPEG_QUALITY: f64 = 0.7;

fn js_err(e: JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{:?}", e))
}

async fn read_as_data_url(file: &File) -> Result<String, String> {
    let reader = FileReader::new().map_err(js_err)?;
    let promise = Promise::new(&mut |resolve, reject| {
        let done = reader.clone();
        let onload = Closure::once_into_js(move || {
            let _ = resolve.call1(&JsValue::NULL, &done.result().unwrap_or(JsValue::NULL));
        });
        let onerror = Closure::once_into_js(move || {
            let _ = reject.call1(&JsValue::NULL, &JsValue::from_str("ファイルを読み込めませんでした"));
        });
        reader.set_onload(Some(onload.unchecked_ref()));
        reader.set_onerror(Some(onerror.unchecked_ref()));
    });
    reader.read_as_data_url(file).map_err(js_err)?;
    JsFuture::from(promise)
        .await
        .map_err(js_err)?
        .as_string()
        .ok_or_else(|| "unexpected reader result".to_string())
}

async fn load_image(src: &str) -> Result<HtmlImageElement, String> {
    let img = HtmlImageElement::new().map_err(js_err)?;
    let promise = Promise::new(&mut |resolve, reject| {
        let onload = Closure::once_into_js(move || {
            let _ = resolve.call0(&JsValue::NULL);
        });
        let onerror = Closure::once_into_js(move || {
            let _ = reject.call1(&JsValue::NULL, &JsValue::from_str("画像を読み込めませんでした"));
        });
        img.set_onload(Some(onload.unchecked_ref()));
        img.set_onerror(Some(onerror.unchecked_ref()));
    });
    img.set_src(src);
    JsFuture::from(promise).await.map_err(js_err)?;
    Ok(img)
}

/// Downscale to `max_width` (never up) and re-encode as JPEG
pub async fn compress_image(file: &File, max_width: u32) -> Result<String, String> {
    let source = read_as_data_url(file).await?;
    let img = load_image(&source).await?;
    let (width, height) = scaled_dimensions(img.natural_width(), img.natural_height(), max_width);

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or("document unavailable")?;
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(js_err)?
        .dyn_into()
        .map_err(|_| "not a canvas".to_string())?;
    canvas.set_width(width);
    canvas.set_height(height);

    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")
        .map_err(js_err)?
        .ok_or("2d context unavailable")?
        .dyn_into()
        .map_err(|_| "not a 2d context".to_string())?;
    ctx.draw_image_with_html_image_element_and_dw_and_dh(&img, 0.0, 0.0, width as f64, height as f64)
        .map_err(js_err)?;

    let compressed = canvas
        .to_data_url_with_type_and_encoder_options("image/jpeg", &JsValue::from_f64(JPEG_QUALITY))
        .map_err(js_err)?;
    tracing::debug!(original = source.len(), compressed = compressed.len(), width, height, "image compressed");
    Ok(compressed)
}
