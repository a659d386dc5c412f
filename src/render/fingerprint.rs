use crate::cache::key::{CacheKey, CacheKind};
use crate::foundation::math::Fnv1a64;
use crate::render::model::RenderRequest;

/// 128-bit identity of a `(subject, request)` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderFingerprint {
    pub hi: u64,
    pub lo: u64,
}

impl RenderFingerprint {
    pub fn to_hex(self) -> String {
        format!("{:016x}{:016x}", self.hi, self.lo)
    }
}

/// Hash the subject reference and every request field that affects pixels.
///
/// `quality` only changes encoding and is left out, so the key covers subject, format, layout,
/// caption, watermark and the brand style (as canonical JSON with sorted keys).
pub fn fingerprint_request(subject_id: &str, req: &RenderRequest) -> RenderFingerprint {
    let mut a = Fnv1a64::new(Fnv1a64::OFFSET_BASIS);
    let mut b = Fnv1a64::new(Fnv1a64::ALT_BASIS);

    write_str_pair(&mut a, &mut b, subject_id);
    write_str_pair(&mut a, &mut b, req.format.as_str());
    write_str_pair(&mut a, &mut b, req.layout.as_str());
    write_str_pair(&mut a, &mut b, &req.caption);
    write_u8_pair(&mut a, &mut b, u8::from(req.watermark));

    match serde_json::to_value(&req.brand_style) {
        Ok(v) => write_json_value_pair(&mut a, &mut b, &v),
        // Unreachable for the derived impl; hash the debug form so the key still varies.
        Err(_) => write_str_pair(&mut a, &mut b, &format!("{:?}", req.brand_style)),
    }

    RenderFingerprint {
        hi: a.finish(),
        lo: b.finish(),
    }
}

/// Render-cache key for a `(subject, request)` pair.
pub fn render_cache_key(subject_id: &str, req: &RenderRequest) -> CacheKey {
    CacheKey::new(
        CacheKind::Render,
        fingerprint_request(subject_id, req).to_hex(),
    )
}

fn write_json_value_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, v: &serde_json::Value) {
    match v {
        serde_json::Value::Null => write_u8_pair(a, b, 0),
        serde_json::Value::Bool(x) => {
            write_u8_pair(a, b, 1);
            write_u8_pair(a, b, u8::from(*x));
        }
        serde_json::Value::Number(n) => {
            write_u8_pair(a, b, 2);
            write_str_pair(a, b, &n.to_string());
        }
        serde_json::Value::String(s) => {
            write_u8_pair(a, b, 3);
            write_str_pair(a, b, s);
        }
        serde_json::Value::Array(items) => {
            write_u8_pair(a, b, 4);
            write_u64_pair(a, b, items.len() as u64);
            for item in items {
                write_json_value_pair(a, b, item);
            }
        }
        serde_json::Value::Object(map) => {
            write_u8_pair(a, b, 5);
            let mut keys = map.keys().collect::<Vec<_>>();
            keys.sort();
            write_u64_pair(a, b, keys.len() as u64);
            for k in keys {
                write_str_pair(a, b, k);
                write_json_value_pair(a, b, &map[k]);
            }
        }
    }
}

fn write_u8_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, v: u8) {
    a.write_u8(v);
    b.write_u8(v);
}

fn write_u64_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, v: u64) {
    a.write_u64(v);
    b.write_u64(v);
}

fn write_str_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, s: &str) {
    write_u64_pair(a, b, s.len() as u64);
    a.write_bytes(s.as_bytes());
    b.write_bytes(s.as_bytes());
}

#[cfg(test)]
#[path = "../../tests/unit/render/fingerprint.rs"]
mod tests;
