use std::sync::Arc;

use museum_sdk::{AiThemeAnalysis, OnboardingResponse};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use time::OffsetDateTime;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::ServiceConfig;
use crate::domain::error::DomainError;
use crate::domain::onboarding::{REQUIRED_RESPONSES, score_responses};
use crate::domain::ports::{TextGenerator, TextOptions};
use crate::domain::prompts;
use crate::domain::repos::UsersRepository;
use crate::domain::response_parser::{extract_json_object, string_field};
use crate::domain::themes::{ThemeCatalog, ThemeDefinition};

/// Stored analysis plus the recommended theme.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub analysis: AiThemeAnalysis,
    pub theme: ThemeDefinition,
}

pub struct OnboardingService<UR> {
    db: DatabaseConnection,
    users: Arc<UR>,
    text: Arc<dyn TextGenerator>,
    catalog: Arc<ThemeCatalog>,
    config: ServiceConfig,
}

impl<UR: UsersRepository> OnboardingService<UR> {
    pub fn new(
        db: DatabaseConnection,
        users: Arc<UR>,
        text: Arc<dyn TextGenerator>,
        catalog: Arc<ThemeCatalog>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            db,
            users,
            text,
            catalog,
            config,
        }
    }

    /// # Errors
    /// `Validation` when fewer than five answers are given, `NotFound` for an
    /// unknown user.
    #[instrument(skip(self, user_id, responses), fields(user_id = %user_id, count = responses.len()))]
    pub async fn save_responses(
        &self,
        user_id: Uuid,
        responses: Vec<OnboardingResponse>,
    ) -> Result<Vec<OnboardingResponse>, DomainError> {
        if responses.len() < REQUIRED_RESPONSES {
            return Err(DomainError::validation("responses", "Incomplete responses"));
        }
        self.users
            .set_onboarding_responses(&self.db, user_id, &responses)
            .await?;
        info!("onboarding responses saved");
        Ok(responses)
    }

    /// Recommends a theme for five answers and stores the result. A failing
    /// or unusable model reply falls back to keyword scoring.
    ///
    /// # Errors
    /// `Validation` for anything but five complete answers, `NotFound` for an
    /// unknown user.
    #[instrument(skip(self, user_id, responses), fields(user_id = %user_id))]
    pub async fn analyze(
        &self,
        user_id: Uuid,
        responses: Vec<OnboardingResponse>,
    ) -> Result<AnalysisOutcome, DomainError> {
        validate_responses(&responses)?;

        let (choice, reason) = match self.ask_model(&responses).await {
            Some(picked) => picked,
            None => {
                let scored = score_responses(&responses);
                info!(choice = scored.choice, "using keyword scoring");
                (scored.choice, scored.reason.to_owned())
            }
        };
        let theme = self
            .catalog
            .get(choice)
            .cloned()
            .ok_or_else(|| DomainError::internal(format!("theme {choice} missing from catalog")))?;

        let analysis = AiThemeAnalysis {
            choice,
            reason,
            theme: theme.name.clone(),
            analyzed_at: OffsetDateTime::now_utc(),
            responses,
        };
        self.users
            .set_ai_analysis(&self.db, user_id, &analysis)
            .await?;

        info!(choice, "theme analysis stored");
        Ok(AnalysisOutcome { analysis, theme })
    }

    /// Runs [`Self::analyze`] on the responses saved in the profile.
    ///
    /// # Errors
    /// `Validation` when fewer than five responses are stored, `NotFound` for
    /// an unknown user.
    #[instrument(skip(self, user_id), fields(user_id = %user_id))]
    pub async fn analyze_from_profile(&self, user_id: Uuid) -> Result<AnalysisOutcome, DomainError> {
        let mut responses = self
            .users
            .find_profile(&self.db, user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))?
            .onboarding_responses;
        if responses.len() < REQUIRED_RESPONSES {
            return Err(DomainError::validation(
                "onboardingResponses",
                "Incomplete responses",
            ));
        }
        responses.truncate(REQUIRED_RESPONSES);
        self.analyze(user_id, responses).await
    }

    /// # Errors
    /// `NotFound` when the user or the analysis does not exist.
    #[instrument(skip(self, user_id), fields(user_id = %user_id))]
    pub async fn get_analysis(&self, user_id: Uuid) -> Result<AiThemeAnalysis, DomainError> {
        self.users
            .find_profile(&self.db, user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))?
            .ai_analysis
            .ok_or_else(|| DomainError::not_found("Analysis", user_id))
    }

    async fn ask_model(&self, responses: &[OnboardingResponse]) -> Option<(u8, String)> {
        let options = TextOptions {
            temperature: Some(self.config.analysis_temperature),
            system_prompt: Some(prompts::THEME_ANALYSIS_SYSTEM.to_owned()),
            json_mode: true,
            max_tokens: Some(self.config.analysis_max_tokens),
        };
        let reply = match self
            .text
            .generate_text(&prompts::theme_analysis_user(responses), &options)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "theme analysis call failed");
                return None;
            }
        };

        let parsed = parse_choice(&reply);
        if parsed.is_none() {
            warn!(reply = %reply, "theme analysis reply unusable");
        } else {
            debug!("theme analysis reply accepted");
        }
        parsed
    }
}

fn validate_responses(responses: &[OnboardingResponse]) -> Result<(), DomainError> {
    if responses.len() != REQUIRED_RESPONSES {
        return Err(DomainError::validation(
            "responses",
            format!("exactly {REQUIRED_RESPONSES} responses are required"),
        ));
    }
    for (i, response) in responses.iter().enumerate() {
        if response.question.trim().is_empty() || response.answer.trim().is_empty() {
            return Err(DomainError::validation(
                format!("responses[{i}]"),
                "question and answer must be non-empty",
            ));
        }
    }
    Ok(())
}

/// `{choice: 1..=5, reason}`; the choice may arrive as a number or a string.
fn parse_choice(reply: &str) -> Option<(u8, String)> {
    let map = extract_json_object(reply)?;
    let choice = match map.get("choice")? {
        Value::Number(n) => n.as_u64().and_then(|n| u8::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u8>().ok(),
        _ => None,
    }?;
    if !(1..=5).contains(&choice) {
        return None;
    }
    let reason = string_field(&map, "reason")?;
    Some((choice, reason.to_owned()))
}
