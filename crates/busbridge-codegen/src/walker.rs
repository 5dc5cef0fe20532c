//! Read-only traversal of a schema file

use crate::schema::{Message, Method, SchemaFile, Service, TypeRef};

/// Walks the messages and services of one [`SchemaFile`]
#[derive(Debug, Clone, Copy)]
pub struct SchemaWalker<'a> {
    file: &'a SchemaFile,
}

impl<'a> SchemaWalker<'a> {
    pub fn new(file: &'a SchemaFile) -> Self {
        Self { file }
    }

    /// The file being walked
    pub fn file(&self) -> &'a SchemaFile {
        self.file
    }

    /// Every message, nested ones included, in depth-first pre-order
    pub fn messages(&self) -> Messages<'a> {
        Messages {
            stack: self.file.messages.iter().rev().collect(),
        }
    }

    /// Services in declaration order
    pub fn services(&self) -> std::slice::Iter<'a, Service> {
        self.file.services.iter()
    }

    /// Every method paired with the service that owns it
    pub fn methods(&self) -> impl Iterator<Item = MethodRef<'a>> + use<'a> {
        self.file.services.iter().flat_map(|service| {
            service
                .methods
                .iter()
                .map(move |method| MethodRef { service, method })
        })
    }

    /// Check if the file declares at least one service
    pub fn has_services(&self) -> bool {
        !self.file.services.is_empty()
    }

    /// Every named type referenced by a field or a method signature
    ///
    /// Field references come first, in message walk order, followed by method
    /// inputs and outputs. Duplicates are kept.
    pub fn type_refs(&self) -> impl Iterator<Item = &'a TypeRef> + use<'a> {
        let fields = self
            .messages()
            .flat_map(|message| message.fields.iter())
            .filter_map(|field| field.ty.type_ref());
        let signatures = self
            .methods()
            .flat_map(|m| [&m.method.input, &m.method.output]);
        fields.chain(signatures)
    }
}

/// Depth-first iterator over messages
#[derive(Debug, Clone)]
pub struct Messages<'a> {
    stack: Vec<&'a Message>,
}

impl<'a> Iterator for Messages<'a> {
    type Item = &'a Message;

    fn next(&mut self) -> Option<Self::Item> {
        let message = self.stack.pop()?;
        self.stack.extend(message.nested.iter().rev());
        Some(message)
    }
}

/// A method and its owning service
#[derive(Debug, Clone, Copy)]
pub struct MethodRef<'a> {
    pub service: &'a Service,
    pub method: &'a Method,
}
