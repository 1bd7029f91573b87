//! Reference transfer functions used to generate the named curve tables.
//!
//! All functions operate on normalized `[0, 1]` values in `f64`; the tables
//! built from them are the only thing the fixed-point engine sees.
//!
//! # Terminology
//!
//! - **EOTF**: encoded signal -> linear light (display side)
//! - **OETF**: linear light -> encoded signal (camera side)
//!
//! # Reference
//!
//! - IEC 61966-2-1:1999 (sRGB)
//! - ITU-R BT.2020-2 (BT.2020 OETF)
//! - SMPTE ST 2084:2014 (PQ)

/// sRGB EOTF: decodes sRGB encoded values to linear light.
///
/// ```text
/// if V <= 0.04045:  L = V / 12.92
/// else:             L = ((V + 0.055) / 1.055)^2.4
/// ```
#[inline]
pub fn srgb_eotf(v: f64) -> f64 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Inverse sRGB EOTF: encodes linear light to sRGB.
#[inline]
pub fn srgb_inv_eotf(l: f64) -> f64 {
    if l <= 0.0031308 {
        l * 12.92
    } else {
        1.055 * l.powf(1.0 / 2.4) - 0.055
    }
}

// BT.2020 constants (12-bit precision values)
const BT2020_ALPHA: f64 = 1.09929682680944;
const BT2020_BETA: f64 = 0.018053968510807;

/// BT.2020 OETF: linear scene light to encoded signal.
///
/// ```text
/// if L < beta:  V = 4.5 * L
/// else:         V = alpha * L^0.45 - (alpha - 1)
/// ```
#[inline]
pub fn bt2020_oetf(l: f64) -> f64 {
    if l < BT2020_BETA {
        4.5 * l
    } else {
        BT2020_ALPHA * l.powf(0.45) - (BT2020_ALPHA - 1.0)
    }
}

/// Inverse BT.2020 OETF: encoded signal to linear scene light.
#[inline]
pub fn bt2020_inv_oetf(v: f64) -> f64 {
    if v < 4.5 * BT2020_BETA {
        v / 4.5
    } else {
        ((v + (BT2020_ALPHA - 1.0)) / BT2020_ALPHA).powf(1.0 / 0.45)
    }
}

// PQ constants from SMPTE ST 2084
const M1: f64 = 2610.0 / 16384.0;
const M2: f64 = 2523.0 / 4096.0 * 128.0;
const C1: f64 = 3424.0 / 4096.0;
const C2: f64 = 2413.0 / 4096.0 * 32.0;
const C3: f64 = 2392.0 / 4096.0 * 32.0;

/// PQ EOTF, normalized so that `1.0` is 10000 cd/m².
#[inline]
pub fn pq_eotf(v: f64) -> f64 {
    if v <= 0.0 {
        return 0.0;
    }
    let vp = v.powf(1.0 / M2);
    let num = (vp - C1).max(0.0);
    let den = C2 - C3 * vp;
    (num / den).powf(1.0 / M1)
}

/// Inverse PQ EOTF, taking luminance normalized so that `1.0` is 10000 cd/m².
#[inline]
pub fn pq_inv_eotf(l: f64) -> f64 {
    if l <= 0.0 {
        return 0.0;
    }
    let yp = l.clamp(0.0, 1.0).powf(M1);
    ((C1 + C2 * yp) / (1.0 + C3 * yp)).powf(M2)
}

/// Pure power 2.2 decode.
#[inline]
pub fn gamma22(v: f64) -> f64 {
    v.max(0.0).powf(2.2)
}

/// Pure power 2.2 encode.
#[inline]
pub fn gamma22_inv(l: f64) -> f64 {
    l.max(0.0).powf(1.0 / 2.2)
}
