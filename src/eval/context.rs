use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::configuration::Configuration;

use super::value::Value;

/// Carrier of the variable scope used while processing one node.
///
/// A context is never mutated in place: adding variables produces a new
/// context sharing everything else with its origin. Local variables live in a
/// flattened map (inherited entries plus the ones added at each level, later
/// additions shadowing earlier ones). Global variables belong to the render
/// request and are visible everywhere.
#[derive(Clone)]
pub struct ExecutionContext {
    configuration: Arc<Configuration>,
    global_variables: Arc<HashMap<String, Value>>,
    local_variables: Arc<HashMap<String, Value>>,
    process_only_elements: bool,
}

impl ExecutionContext {
    pub fn new(
        configuration: Arc<Configuration>,
        global_variables: HashMap<String, Value>,
    ) -> Self {
        let process_only_elements = configuration.settings().process_only_elements;
        Self {
            configuration,
            global_variables: Arc::new(global_variables),
            local_variables: Arc::new(HashMap::new()),
            process_only_elements,
        }
    }

    pub fn configuration(&self) -> &Arc<Configuration> {
        &self.configuration
    }

    /// New context whose local scope is this one's plus `variables`.
    pub fn with_added_variables(&self, variables: &HashMap<String, Value>) -> Self {
        if variables.is_empty() {
            return self.clone();
        }
        let mut scope = HashMap::with_capacity(self.local_variables.len() + variables.len());
        scope.extend(
            self.local_variables
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        scope.extend(variables.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self {
            configuration: self.configuration.clone(),
            global_variables: self.global_variables.clone(),
            local_variables: Arc::new(scope),
            process_only_elements: self.process_only_elements,
        }
    }

    pub fn with_process_only_elements(&self, value: bool) -> Self {
        Self {
            process_only_elements: value,
            ..self.clone()
        }
    }

    /// The flattened local scope.
    pub fn current_scope(&self) -> &HashMap<String, Value> {
        &self.local_variables
    }

    pub fn has_variables(&self) -> bool {
        !self.local_variables.is_empty()
    }

    pub fn global_variables(&self) -> &HashMap<String, Value> {
        &self.global_variables
    }

    /// Looks a name up in the local scope first, then in the global variables.
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.local_variables
            .get(name)
            .or_else(|| self.global_variables.get(name))
    }

    pub fn process_only_elements(&self) -> bool {
        self.process_only_elements
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("global_variables", &self.global_variables)
            .field("local_variables", &self.local_variables)
            .field("process_only_elements", &self.process_only_elements)
            .finish()
    }
}
