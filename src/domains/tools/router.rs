//! Tool Router - builds the rmcp ToolRouter from the tool definitions.
//!
//! Each tool knows how to create its own route; this module only lists them.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;

use super::ToolContext;
use super::definitions::{DogImageTool, RawCompletionTool, WeatherInsightTool};

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(context: Arc<ToolContext>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    ToolRouter::new()
        .with_route(DogImageTool::create_route(context.clone()))
        .with_route(RawCompletionTool::create_route(context.clone()))
        .with_route(WeatherInsightTool::create_route(context))
}

#[cfg(test)]
mod tests {
    use super::super::registry::ToolRegistry;
    use super::*;
    use crate::domains::tools::definitions::test_support::{ScriptedProvider, config_for, context_with};

    struct TestServer {}

    fn test_context() -> Arc<ToolContext> {
        context_with(config_for("http://127.0.0.1:9"), ScriptedProvider::replying(""))
    }

    #[test]
    fn test_build_router() {
        let router: ToolRouter<TestServer> = build_tool_router(test_context());
        let tools = router.list_all();
        assert_eq!(tools.len(), 3);

        let names: Vec<_> = tools.iter().map(|t| t.name.as_ref()).collect();
        assert!(names.contains(&"weather-insight"));
        assert!(names.contains(&"raw-completion"));
        assert!(names.contains(&"dog-image"));
    }

    #[test]
    fn test_weather_insight_schema_requires_city() {
        let router: ToolRouter<TestServer> = build_tool_router(test_context());
        let tool = router
            .list_all()
            .into_iter()
            .find(|t| t.name == "weather-insight")
            .unwrap();

        let schema = serde_json::Value::Object((*tool.input_schema).clone());
        assert!(schema["properties"]["city"].is_object());
        assert!(
            schema["required"]
                .as_array()
                .unwrap()
                .iter()
                .any(|v| v == "city")
        );
    }

    #[test]
    fn test_registry_matches_router() {
        // Ensure registry and router have the same tools
        let context = test_context();
        let registry = ToolRegistry::new(context.clone());
        let registry_names = registry.tool_names();

        let router: ToolRouter<TestServer> = build_tool_router(context);
        let router_tools = router.list_all();
        let router_names: Vec<_> = router_tools.iter().map(|t| t.name.as_ref()).collect();

        assert_eq!(registry_names.len(), router_names.len());
        for name in registry_names {
            assert!(router_names.contains(&name));
        }
    }
}
