use crate::insight::{Insight, InsightRequest};
use crate::Result;

/// Answers every prompt with a fixed markdown reply that echoes the question. Used when the
/// program runs in test mode so that no request leaves the machine.
#[derive(Debug, Default, Clone, Copy)]
pub struct CannedInsight;

#[async_trait::async_trait]
impl Insight for CannedInsight {
    async fn generate(&self, request: &InsightRequest) -> Result<String> {
        let question = request
            .prompt
            .lines()
            .next()
            .and_then(|l| l.strip_prefix("User Question: "))
            .unwrap_or_default()
            .trim_matches('"');
        let records = request.prompt.matches("\"id\":").count();
        Ok(format!(
            "**Test mode**\n\n- Question: *{question}*\n- Transactions received: {records}"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::user_prompt;
    use crate::store::seed_transactions;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_canned_reply() {
        let today = NaiveDate::from_ymd_opt(2024, 8, 15).unwrap();
        let request = InsightRequest {
            system_instruction: String::new(),
            prompt: user_prompt("Am I saving?", &seed_transactions(today)).unwrap(),
        };
        let reply = CannedInsight.generate(&request).await.unwrap();
        assert_eq!(
            reply,
            "**Test mode**\n\n- Question: *Am I saving?*\n- Transactions received: 4"
        );
    }
}
