/// Aspect ratio requested from the image model for every portrait.
pub const ASPECT_RATIO: &str = "3:4";

/// Assemble the fixed portrait instruction around a style directive.
///
/// The instruction text is a tuned contract with the image model: identity
/// preservation, gender-appropriate business attire, the requested lighting
/// style, head-and-shoulders composition on a neutral studio background.
pub fn portrait_instruction(style_prompt: &str) -> String {
    format!(
        r#"YOU ARE A MASTER COMMERCIAL PORTRAIT PHOTOGRAPHER.

TASK: Transform the user's casual photo into a "Haimati" style high-end business portrait.

CORE REQUIREMENTS:
1. GENDER-SPECIFIC ATTIRE:
   - Analyze the subject's gender.
   - IF FEMALE: Dress her in a high-quality professional blazer, a crisp tailored white shirt, or elegant corporate office attire.
   - IF MALE: Dress him in a modern, slim-fit professional suit (black, navy, or charcoal), a perfectly pressed dress shirt, and a professional tie.
2. IDENTITY PRESERVATION: Maintain the subject's facial features, eye shape, and bone structure. They must be easily recognizable as the same person.
3. STYLE & LIGHTING: Strictly follow this artistic lighting style: "{style_prompt}".
4. COMPOSITION: Standard 3:4 business portrait (head and shoulders). Background should be a clean, solid studio color (grey, white, or navy) that matches the style.
5. QUALITY: Professional-grade retouching. Skin should look natural yet perfect. Hair should be neat and groomed.

NO CASUAL CLOTHES ALLOWED. THE SUBJECT MUST LOOK LIKE A TOP-TIER PROFESSIONAL."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_embeds_style_directive() {
        let instruction = portrait_instruction("dramatic low key lighting");
        assert!(instruction.contains("\"dramatic low key lighting\""));
    }

    #[test]
    fn test_instruction_keeps_contract_clauses() {
        let instruction = portrait_instruction("x");
        assert!(instruction.contains("IDENTITY PRESERVATION"));
        assert!(instruction.contains("GENDER-SPECIFIC ATTIRE"));
        assert!(instruction.contains("3:4 business portrait"));
        assert!(instruction.contains("head and shoulders"));
    }
}
