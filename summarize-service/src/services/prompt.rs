use crate::models::EmailRequest;

/// Build the instruction sent to the model for a single email.
///
/// The model runs in JSON output mode, so the prompt only has to name the two keys.
pub fn build_summary_prompt(email: &EmailRequest) -> String {
    format!(
        "Analyze the following email and provide a concise summary and a polite, brief reply draft.\n\
         Return the output as a single, clean JSON object with two keys: \"summary\" and \"reply_draft\".\n\
         \n\
         Email from: {}\n\
         Subject: {}\n\
         Body: {}\n",
        email.sender, email.subject, email.body
    )
}
