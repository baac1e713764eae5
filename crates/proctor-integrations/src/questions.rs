use anyhow::{Context, Result};
use async_trait::async_trait;
use proctor_core::question::Question;
use proctor_core::supply::{QuestionSupply, RoleDescriptor};
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonQuestions {
    List(Vec<Question>),
    Wrapped { questions: Vec<Question> },
}

#[derive(Deserialize)]
struct TomlQuestions {
    questions: Vec<Question>,
}

/// Reads questions produced ahead of time by the question generator.
///
/// `path` is either a single `.json`/`.toml` file or a directory holding one
/// file per role, named after the role (`backend-engineer.json`).
pub struct FileQuestionSupply {
    path: PathBuf,
    fence: Regex,
}

impl FileQuestionSupply {
    /// # Errors
    ///
    /// Returns an error if the fence pattern fails to compile.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            path: path.into(),
            fence: Regex::new(r"(?s)^\s*```[A-Za-z]*\s*\n(.*?)\n?\s*```\s*$")?,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn resolve(&self, descriptor: &RoleDescriptor) -> Result<PathBuf> {
        if !self.path.is_dir() {
            return Ok(self.path.clone());
        }
        let stem = role_slug(&descriptor.role);
        ["json", "toml"]
            .iter()
            .map(|ext| self.path.join(format!("{stem}.{ext}")))
            .find(|candidate| candidate.is_file())
            .with_context(|| {
                format!(
                    "No question file for role {:?} in {}",
                    descriptor.role,
                    self.path.display()
                )
            })
    }

    /// Remove a surrounding markdown code fence, if any
    fn strip_fence<'a>(&self, text: &'a str) -> &'a str {
        self.fence
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map_or(text, |m| m.as_str())
    }

    fn parse(&self, text: &str, format: Format) -> Result<Vec<Question>> {
        let body = self.strip_fence(text);
        match format {
            Format::Json => {
                let parsed: JsonQuestions =
                    serde_json::from_str(body).context("Invalid question JSON")?;
                Ok(match parsed {
                    JsonQuestions::List(questions) | JsonQuestions::Wrapped { questions } => {
                        questions
                    }
                })
            }
            Format::Toml => {
                let parsed: TomlQuestions =
                    toml::from_str(body).context("Invalid question TOML")?;
                Ok(parsed.questions)
            }
        }
    }
}

fn role_slug(role: &str) -> String {
    let slug: String = role
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    slug.split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[async_trait]
impl QuestionSupply for FileQuestionSupply {
    async fn fetch(&self, descriptor: &RoleDescriptor) -> Result<Vec<Question>> {
        let path = self.resolve(descriptor)?;
        let text = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let questions = self
            .parse(&text, Format::from_path(&path))
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        log::debug!("Read {} questions from {}", questions.len(), path.display());
        Ok(questions)
    }

    fn name(&self) -> &str {
        "question file"
    }
}
