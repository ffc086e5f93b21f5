//! Tool Router - builds the rmcp ToolRouter from the tool definitions.
//!
//! Each tool knows how to create its own route.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;

use super::definitions::{ReadFileTool, WriteFileTool};
use crate::domains::files::FileService;

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(service: Arc<FileService>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    ToolRouter::new()
        .with_route(ReadFileTool::create_route(service.clone()))
        .with_route(WriteFileTool::create_route(service))
}

#[cfg(test)]
mod tests {
    use super::super::registry::ToolRegistry;
    use super::*;
    use crate::core::security::AccessPolicy;

    struct TestServer {}

    fn test_service() -> Arc<FileService> {
        Arc::new(FileService::new(Arc::new(AccessPolicy::new(
            ["/tmp"],
            [".conf"],
            None,
            1024,
            true,
        ))))
    }

    #[test]
    fn test_registry_matches_router() {
        let service = test_service();
        let registry_names = ToolRegistry::tool_names();

        let router: ToolRouter<TestServer> = build_tool_router(service);
        let router_tools = router.list_all();
        let router_names: Vec<_> = router_tools.iter().map(|t| t.name.as_ref()).collect();

        assert_eq!(registry_names.len(), router_names.len());
        for name in registry_names {
            assert!(router_names.contains(&name));
        }
        assert!(router_tools.iter().all(|t| t.output_schema.is_some()));
    }
}
