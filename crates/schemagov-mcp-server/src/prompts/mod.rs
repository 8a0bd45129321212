// ABOUTME: MCP prompt resources guiding agents through the schema.gov.it tool catalogue
// ABOUTME: Served as server instructions and as a named prompt

pub const INITIAL_INSTRUCTIONS: &str = include_str!("initial_instructions.md");

pub const INITIAL_INSTRUCTIONS_PROMPT_NAME: &str = "schemagov_initial_instructions";
