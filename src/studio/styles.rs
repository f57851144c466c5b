use rand::seq::SliceRandom;
use serde::Serialize;
use ts_rs::TS;

use crate::error::AppError;

/// Reserved preset id whose prompt is resolved from the hidden pool at
/// generation time instead of being sent to the model.
pub const RANDOM_STYLE_ID: &str = "random";

/// A named, pre-authored style configuration. The catalog is static;
/// there is no runtime mutation.
#[derive(Debug, Clone, Copy, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StylePreset {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub prompt_text: &'static str,
    pub preview_image_ref: &'static str,
}

const STYLE_PRESETS: [StylePreset; 6] = [
    StylePreset {
        id: RANDOM_STYLE_ID,
        name: "随机",
        description: "每次生成都是一次艺术开箱",
        // Sentinel — never sent to the model, see resolve_effective_prompt
        prompt_text: "RANDOM",
        preview_image_ref: "https://images.unsplash.com/photo-1550684848-fac1c5b4e853?q=80&w=200&h=200&auto=format&fit=crop",
    },
    StylePreset {
        id: "01",
        name: "黑白电影感",
        description: "戏剧性低调光影，雕刻五官轮廓",
        prompt_text: "black and white studio portrait, dramatic low key lighting, strong single side key light, deep shadows sculpting facial structure, cinematic contrast, editorial photography style, realistic skin texture with visible pores, minimal makeup, sharp details, dark plain background, moody atmosphere, professional RAW photo, ultra realistic",
        preview_image_ref: "https://picsum.photos/seed/style1/400/500",
    },
    StylePreset {
        id: "02",
        name: "柔光暖色肖像",
        description: "商业高调柔光，自然且精致的面容",
        prompt_text: "soft warm color portrait, high key studio lighting with diffused soft light, creamy skin tones, natural yet polished makeup, smooth but realistic skin texture, luxury commercial photography style, clean bright background, elegant and approachable mood, professional studio photo, high detail",
        preview_image_ref: "https://picsum.photos/seed/style2/400/500",
    },
    StylePreset {
        id: "03",
        name: "冷色未来感",
        description: "青蓝调边缘光，科幻时尚大片",
        prompt_text: "cool tone portrait, cinematic blue and cyan lighting, strong rim light outlining silhouette, futuristic fashion photography style, glossy highlights on skin, minimal modern makeup, dark gradient background, high contrast, ultra sharp focus, sci fi mood, professional studio photo",
        preview_image_ref: "https://picsum.photos/seed/style3/400/500",
    },
    StylePreset {
        id: "04",
        name: "复古油画光影",
        description: "伦勃朗式光影，艺术馆级质感",
        prompt_text: "warm cinematic portrait, Rembrandt lighting with soft shadow transitions, golden amber tones, painterly light and shadow, fine art photography style, natural skin texture, vintage inspired makeup, dark brown background, emotional and artistic mood, museum quality portrait",
        preview_image_ref: "https://picsum.photos/seed/style4/400/500",
    },
    StylePreset {
        id: "05",
        name: "高对比时尚",
        description: "红蓝大胆撞色，杂志封面风",
        prompt_text: "high fashion portrait, bold red and blue color lighting, strong directional studio lights, high contrast shadows, editorial magazine cover photography, sharp and clean makeup look, confident expression, dark studio background, modern and striking aesthetic, ultra high detail",
        preview_image_ref: "https://picsum.photos/seed/style5/400/500",
    },
];

/// Prompt directives used exclusively when the "random" preset is active.
/// Disjoint from the visible preset prompts and never shown in the UI.
const HIDDEN_RANDOM_PROMPTS: [&str; 5] = [
    "ethereal soft light studio portrait, glowing skin, dreamy atmosphere, professional corporate attire, soft focus background, elegant white color palette, high detail, luxury feel",
    "minimalist nordic style portrait, sharp focus, clean lines, professional charcoal suit, stark white studio background, neutral lighting, high fashion editorial, crisp details",
    "golden hour studio lighting portrait, warm amber highlights, professional corporate dress, sunset vibe but in a professional studio setting, highly detailed skin texture, professional RAW photo",
    "dramatic aurora cold lighting, professional creative industry portrait, bold emerald and violet accents on a business suit, dark charcoal background, sharp focus, cinematic high-end look",
    "technicolor pop art portrait, vibrant studio gels, professional designer outfit, clean bold highlights, fashion magazine aesthetic, sharp eyes, high fashion photography",
];

/// The full preset catalog, in carousel order. The "random" meta-style is first.
pub fn presets() -> &'static [StylePreset] {
    &STYLE_PRESETS
}

/// Default selection when a session starts.
pub fn default_preset() -> &'static StylePreset {
    &STYLE_PRESETS[0]
}

pub fn find(id: &str) -> Result<&'static StylePreset, AppError> {
    STYLE_PRESETS
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| AppError::NotFound(format!("StylePreset {id}")))
}

/// Resolve the prompt actually sent to the model.
///
/// Called at the moment generation starts, not at selection time, so repeated
/// generations with "random" selected yield independent draws from the
/// hidden pool. Every other preset uses its own prompt text.
pub fn resolve_effective_prompt(preset: &StylePreset) -> &'static str {
    if preset.id == RANDOM_STYLE_ID {
        HIDDEN_RANDOM_PROMPTS
            .choose(&mut rand::thread_rng())
            .expect("hidden prompt pool is non-empty")
    } else {
        preset.prompt_text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_ids_are_unique() {
        let ids: HashSet<_> = presets().iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), presets().len());
        assert!(ids.contains(RANDOM_STYLE_ID));
    }

    #[test]
    fn test_find_known_and_unknown() {
        assert_eq!(find("01").unwrap().name, "黑白电影感");
        assert!(matches!(find("nope"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_named_preset_resolves_to_own_prompt() {
        let preset = find("02").unwrap();
        assert_eq!(resolve_effective_prompt(preset), preset.prompt_text);
    }

    #[test]
    fn test_random_resolves_from_hidden_pool_only() {
        let random = find(RANDOM_STYLE_ID).unwrap();
        for _ in 0..50 {
            let prompt = resolve_effective_prompt(random);
            assert!(HIDDEN_RANDOM_PROMPTS.contains(&prompt));
            // Never the sentinel, never a visible preset prompt
            assert_ne!(prompt, random.prompt_text);
            assert!(!presets().iter().any(|p| p.prompt_text == prompt));
        }
    }

    #[test]
    fn test_random_draws_are_independent() {
        // 40 draws across a pool of 5 hit more than one entry with
        // overwhelming probability.
        let random = find(RANDOM_STYLE_ID).unwrap();
        let distinct: HashSet<_> = (0..40).map(|_| resolve_effective_prompt(random)).collect();
        assert!(distinct.len() > 1);
    }
}
