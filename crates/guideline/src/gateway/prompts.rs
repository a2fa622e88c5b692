//! Instruction templates for the two pipeline stages.

pub fn summary_prompt(text: &str) -> String {
    format!(
        "Please provide a concise summary of the following guideline document.\n\
         Focus on the key points, main requirements, and important procedures.\n\
         \n\
         Text to summarize:\n\
         {}",
        text
    )
}

pub fn checklist_prompt(summary: &str) -> String {
    format!(
        "Based on the following summary of a guideline document, create a practical checklist\n\
         that someone could use to ensure compliance with the guidelines.\n\
         Return the checklist as a JSON array of strings, where each string is a checklist item.\n\
         \n\
         Summary:\n\
         {}\n\
         \n\
         Please respond with only the JSON array, no additional text.",
        summary
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_prompt_embeds_text() {
        let prompt = summary_prompt("Lock the door.");
        assert!(prompt.starts_with("Please provide a concise summary"));
        assert!(prompt.ends_with("Text to summarize:\nLock the door."));
    }

    #[test]
    fn test_checklist_prompt_asks_for_json() {
        let prompt = checklist_prompt("Doors stay locked.");
        assert!(prompt.contains("Summary:\nDoors stay locked.\n"));
        assert!(prompt.contains("JSON array of strings"));
        assert!(prompt.ends_with("no additional text."));
    }
}
