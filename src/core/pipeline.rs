use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::DependencyGraph;
use crate::frontends::FrontEndKind;
use crate::middlewares::{Middleware, MiddlewareKind};

/// One frontend followed by an ordered chain of middlewares.
///
/// The graph is moved from stage to stage; the first failing stage ends the
/// run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    pub frontend: FrontEndKind,
    pub middlewares: Vec<MiddlewareKind>,
}

impl Pipeline {
    pub fn new(frontend: FrontEndKind) -> Self {
        Self {
            frontend,
            middlewares: Vec::new(),
        }
    }

    pub fn with_middleware(mut self, middleware: MiddlewareKind) -> Self {
        self.middlewares.push(middleware);
        self
    }

    pub fn run(&self) -> Result<DependencyGraph> {
        let frontend = self.frontend.build()?;
        info!("Using front-end: {}", frontend.frontend_name());

        // build every stage first so that a bad regex fails before extraction
        let middlewares = self
            .middlewares
            .iter()
            .map(MiddlewareKind::build)
            .collect::<Result<Vec<_>, _>>()?;
        if middlewares.is_empty() {
            info!("No middleware.");
        } else {
            let names: Vec<String> = middlewares
                .iter()
                .map(|middleware| middleware.middleware_name())
                .collect();
            info!("Using middlewares: {}", names.join(", "));
        }

        let graph = frontend.dependency_graph()?;
        Self::apply(graph, &middlewares)
    }

    /// Thread `graph` through `middlewares`, in order.
    pub fn apply(
        mut graph: DependencyGraph,
        middlewares: &[Box<dyn Middleware>],
    ) -> Result<DependencyGraph> {
        for middleware in middlewares {
            graph = middleware.transform(graph)?;
        }
        Ok(graph)
    }
}
