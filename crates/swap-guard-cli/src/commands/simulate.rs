use std::path::Path;

use anyhow::Result;
use swap_guard::GuardConfig;
use swap_guard::platform::headless::{ClickOutcome, HeadlessDocument, HeadlessPage};

use crate::Answer;

pub struct Simulation {
    pub click: usize,
    /// The question the user was asked, if the link is guarded.
    pub prompt: Option<String>,
    pub outcome: ClickOutcome,
}

pub fn simulate(
    document: HeadlessDocument,
    config: &GuardConfig,
    click: usize,
    answer: Answer,
) -> Result<Simulation> {
    let mut page = HeadlessPage::new(document, config.clone());
    page.initialize();
    page.confirm_mut().set_default_answer(answer.confirmed());

    let outcome = page.click(click)?;
    Ok(Simulation {
        click,
        prompt: page.confirm().prompts().first().cloned(),
        outcome,
    })
}

pub fn render(simulation: &Simulation) -> Vec<String> {
    let mut lines = Vec::new();
    match &simulation.prompt {
        Some(prompt) => lines.push(format!("Prompt: {prompt}")),
        None => lines.push(format!("Link [{}] is not guarded, no prompt", simulation.click)),
    }
    let outcome = &simulation.outcome;
    if outcome.prevented {
        lines.push("Default action prevented, page stays".to_owned());
    }
    match &outcome.navigated_to {
        Some(target) => lines.push(format!("Navigates to {target}")),
        None if !outcome.prevented => lines.push("Link has no href, page stays".to_owned()),
        None => {}
    }
    lines
}

pub fn run(
    file: &Path,
    config: &GuardConfig,
    click: usize,
    answer: Answer,
    json: bool,
) -> Result<()> {
    let document = super::read_document(file)?;
    let simulation = simulate(document, config, click, answer)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&simulation.outcome)?);
        return Ok(());
    }
    for line in render(&simulation) {
        println!("{line}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn my_swaps() -> HeadlessDocument {
        HeadlessDocument::parse_html(
            r#"<a href="/swap/5/delete_swap">Cancel</a>
               <a href="/swap/5/view">View</a>
               <a name="top">Top</a>"#,
        )
    }

    #[test]
    fn answering_no_keeps_the_page() {
        let simulation = simulate(my_swaps(), &GuardConfig::default(), 0, Answer::No).unwrap();
        assert!(simulation.outcome.prevented);
        assert_eq!(
            render(&simulation),
            [
                "Prompt: Are you sure you want to cancel this swap request?",
                "Default action prevented, page stays",
            ]
        );
    }

    #[test]
    fn answering_yes_navigates() {
        let simulation = simulate(my_swaps(), &GuardConfig::default(), 0, Answer::Yes).unwrap();
        assert_eq!(
            simulation.outcome.navigated_to.as_deref(),
            Some("/swap/5/delete_swap")
        );
        assert_eq!(render(&simulation)[1], "Navigates to /swap/5/delete_swap");
    }

    #[test]
    fn unguarded_and_bare_links() {
        let view = simulate(my_swaps(), &GuardConfig::default(), 1, Answer::No).unwrap();
        assert_eq!(
            render(&view),
            ["Link [1] is not guarded, no prompt", "Navigates to /swap/5/view"]
        );

        let top = simulate(my_swaps(), &GuardConfig::default(), 2, Answer::No).unwrap();
        assert_eq!(
            render(&top),
            ["Link [2] is not guarded, no prompt", "Link has no href, page stays"]
        );
    }

    #[test]
    fn click_past_last_link_fails() {
        let error = simulate(my_swaps(), &GuardConfig::default(), 9, Answer::Yes)
            .err()
            .unwrap();
        assert_eq!(error.to_string(), "document has no link at position 9");
    }

    #[test]
    fn json_output_shape() {
        let simulation = simulate(my_swaps(), &GuardConfig::default(), 0, Answer::No).unwrap();
        let json = serde_json::to_value(&simulation.outcome).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "prompted": true, "prevented": true, "navigated_to": null })
        );
    }
}
