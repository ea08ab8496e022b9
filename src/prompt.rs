use polars::prelude::DataFrame;

pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Render the analyst prompt: framing, a bounded preview of `data`, then the
/// question verbatim.
pub fn build_prompt(data: &DataFrame, question: &str, preview_rows: usize) -> String {
    let preview = data.head(Some(preview_rows));

    format!(
        r#"You are a data analyst. Given the following data, answer the user's query.

Data:
{}

Query:
{}

Provide a clear and concise response."#,
        preview, question
    )
}
