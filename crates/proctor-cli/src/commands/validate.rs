/// Question file validation
use super::helpers::{option_label, truncate_str};
use anyhow::Result;
use proctor_core::config::EngineConfig;
use proctor_core::question::QuestionSet;
use proctor_core::supply::{load_question_set, RoleDescriptor};
use proctor_integrations::FileQuestionSupply;
use std::path::Path;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct QuestionRow {
    #[tabled(rename = "#")]
    number: usize,
    #[tabled(rename = "Question")]
    prompt: String,
    #[tabled(rename = "Answer")]
    answer: String,
}

fn question_rows(set: &QuestionSet) -> Vec<QuestionRow> {
    set.iter()
        .enumerate()
        .map(|(index, question)| QuestionRow {
            number: index + 1,
            prompt: truncate_str(&question.prompt, 60),
            answer: format!(
                "{}) {}",
                option_label(question.correct_option_index),
                truncate_str(
                    question
                        .options
                        .get(question.correct_option_index)
                        .map_or("", String::as_str),
                    30
                )
            ),
        })
        .collect()
}

pub async fn validate_command(config_path: Option<&Path>, path: &Path, role: &str) -> Result<()> {
    let config = EngineConfig::load_or_default(config_path)?;
    let supply = FileQuestionSupply::new(path)?;
    let set = load_question_set(&supply, &RoleDescriptor::new(role), &config.questions).await?;

    let table = Table::new(question_rows(&set)).to_string();
    println!("{table}");
    println!("\n{} questions OK", set.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proctor_core::config::QuestionRules;
    use proctor_core::question::Question;

    #[test]
    fn test_rows_show_correct_option() {
        let set = QuestionSet::new(
            vec![Question {
                prompt: String::from("Capital of France?"),
                options: vec![
                    String::from("Berlin"),
                    String::from("Paris"),
                    String::from("Rome"),
                    String::from("Madrid"),
                ],
                correct_option_index: 1,
            }],
            &QuestionRules::any_count(),
        )
        .unwrap();

        let rows = question_rows(&set);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].number, 1);
        assert_eq!(rows[0].answer, "B) Paris");
    }
}
