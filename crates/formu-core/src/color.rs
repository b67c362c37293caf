// Copyright 2025 Formu Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Deterministic HSL color derivation.
//!
//! Maps a concept code (or any string) to a background/border color pair.
//! The front-end reimplements the same recipe, so the math is pinned to
//! 32-bit wraparound semantics: a multiplier-31 rolling hash over UTF-16
//! code units followed by a fixed avalanche of xor-shifts and wrapping
//! multiplications. Identical inputs yield identical colors on both sides
//! of the wire, across runs and platforms.

/// Coherent background/border pair: same hue, the border darker and less
/// saturated than the pastel background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorPair {
    /// Pastel fill color, `hsl(h, s%, l%)`.
    pub background: String,
    /// Darker border color with the same hue.
    pub border: String,
}

/// Rolling hash with avalanche mixing, 32-bit wraparound throughout.
fn mix(input: &str) -> i32 {
    let mut hash: i32 = 0;
    for unit in input.encode_utf16() {
        hash = hash.wrapping_mul(31).wrapping_add(i32::from(unit));
    }

    hash ^= ((hash as u32) >> 16) as i32;
    hash = hash.wrapping_mul(0x85eb_ca6b_u32 as i32);
    hash ^= ((hash as u32) >> 13) as i32;
    hash = hash.wrapping_mul(0xc2b2_ae35_u32 as i32);
    hash ^= ((hash as u32) >> 16) as i32;
    hash.wrapping_abs()
}

/// Derive the background/border pair for an input string.
///
/// Blank input gets a fixed neutral gray pair.
pub fn hash_to_colors(input: &str) -> ColorPair {
    if input.trim().is_empty() {
        return ColorPair {
            background: "hsl(0, 0%, 90%)".to_string(),
            border: "hsl(0, 0%, 60%)".to_string(),
        };
    }

    let hash = mix(input);
    let hue = hash % 360;

    // Background: pastel, saturation 65-85%, lightness 80-90%.
    let bg_saturation = 65 + (hash / 360) % 20;
    let bg_lightness = 80 + (hash / 7200) % 10;

    // Border: same hue, saturation 50-70%, lightness 40-55%.
    let border_saturation = 50 + (hash / 360) % 20;
    let border_lightness = 40 + (hash / 7200) % 15;

    ColorPair {
        background: format!("hsl({hue}, {bg_saturation}%, {bg_lightness}%)"),
        border: format!("hsl({hue}, {border_saturation}%, {border_lightness}%)"),
    }
}

/// Background color only.
pub fn hash_to_color(input: &str) -> String {
    hash_to_colors(input).background
}
