use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use crate::framing::CommandHandler;

pub struct FunctionDescriptor{
    pub id: u8,
    pub name: &'static str,
    //overrides the module default when set
    pub length: Option<usize>,
    handler: Option<Arc<dyn CommandHandler>>,
}

impl FunctionDescriptor{
    pub fn new(id: u8, name: &'static str) -> Self{
        FunctionDescriptor{ id, name, length: None, handler: None }
    }

    pub fn with_length(mut self, length: usize) -> Self{
        self.length = Some(length);
        self
    }

    pub fn with_handler(mut self, handler: Arc<dyn CommandHandler>) -> Self{
        self.handler = Some(handler);
        self
    }

    pub fn handler(&self) -> Option<&Arc<dyn CommandHandler>>{
        self.handler.as_ref()
    }
}

impl fmt::Debug for FunctionDescriptor{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result{
        f.debug_struct("FunctionDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("length", &self.length)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

#[derive(Debug)]
pub struct ModuleDescriptor{
    pub id: u8,
    pub name: &'static str,
    //total length of any command in this module, start and terminator included
    pub length: usize,
    functions: HashMap<u8, FunctionDescriptor>,
}

impl ModuleDescriptor{
    pub fn new(id: u8, name: &'static str, length: usize) -> Self{
        ModuleDescriptor{ id, name, length, functions: HashMap::new() }
    }

    pub fn function(mut self, function: FunctionDescriptor) -> Self{
        self.functions.insert(function.id, function);
        self
    }

    pub fn get_function(&self, id: u8) -> Option<&FunctionDescriptor>{
        self.functions.get(&id)
    }
}

/// Result of looking up a command's header bytes.
#[derive(Clone)]
pub struct Resolution{
    pub module_id: u8,
    pub module_name: &'static str,
    pub function_name: Option<&'static str>,
    pub expected_len: usize,
    pub handler: Option<Arc<dyn CommandHandler>>,
}

impl fmt::Debug for Resolution{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result{
        f.debug_struct("Resolution")
            .field("module_id", &self.module_id)
            .field("module_name", &self.module_name)
            .field("function_name", &self.function_name)
            .field("expected_len", &self.expected_len)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

/// Immutable module registry, built once at startup and shared read-only.
#[derive(Debug, Default)]
pub struct ModuleTable{
    modules: HashMap<u8, ModuleDescriptor>,
}

impl ModuleTable{
    pub fn new() -> Self{
        ModuleTable{ modules: HashMap::new() }
    }

    pub fn module(mut self, module: ModuleDescriptor) -> Self{
        self.modules.insert(module.id, module);
        self
    }

    pub fn get(&self, module_id: u8) -> Option<&ModuleDescriptor>{
        self.modules.get(&module_id)
    }

    pub fn len(&self) -> usize{
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool{
        self.modules.is_empty()
    }

    /// Resolve a (possibly partial) command buffer.
    ///
    /// `None` only when the module byte is missing or unknown. An unknown
    /// function inside a known module still resolves, with the module's
    /// default length and no handler.
    pub fn resolve(&self, bytes: &[u8]) -> Option<Resolution>{
        let module = self.modules.get(bytes.get(1)?)?;
        let function = bytes.get(2).and_then(|id| module.get_function(*id));

        Some(Resolution{
            module_id: module.id,
            module_name: module.name,
            function_name: function.map(|f| f.name),
            expected_len: function.and_then(|f| f.length).unwrap_or(module.length),
            handler: function.and_then(|f| f.handler.clone()),
        })
    }
}
