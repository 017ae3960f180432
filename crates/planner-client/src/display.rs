//! Presentation helpers for UIs consuming the event stream.

/// Maps an agent name to a human-readable label with an icon.
///
/// Both the PascalCase names used by the current agent graph and the older
/// snake_case names are recognised; anything else is shown as-is.
pub fn agent_display_name(agent_name: &str) -> String {
    let label = match agent_name {
        "PreprocessInputAgent" | "preprocess_agent" => "📋 Input Processing",
        "WeatherAgent" | "weather_agent" => "🌤️ Weather Check",
        "WeatherRouter" | "weather_router_agent" => "🔀 Planning Router",
        "LocalActivitiesAgent" | "local_activities_agent" => "🎯 Local Activities",
        "SpecialEventsAgent" | "special_events_agent" => "🎉 Special Events",
        "HomeActivitiesAgent" | "home_activities_agent" => "🏠 Home Activities",
        "SummarizerAgent" | "summarizer_agent" => "📝 Final Summary",
        other => return format!("🤖 {other}"),
    };
    label.to_string()
}

/// Formats planner input as the message the root agent expects.
pub fn format_user_message(zip_code: &str, kids_ages: &str) -> String {
    format!("{} kids are {}", zip_code.trim(), kids_ages.trim())
}
