//! Handler locator: turns configured handlers and scanned assembly types into registration entries.

use crate::config::Options;

use super::entry::RegistrationEntry;

/// Emits one entry per (handler type, handler contract). Explicit handlers come first, then assembly
/// types that declare a handler contract and no decorator contract. Output is lazy and may be iterated
/// any number of times with the same result.
#[derive(Debug, Default, Clone, Copy)]
pub struct HandlerLocator;

impl HandlerLocator {
    pub fn locate<'a>(&self, options: &'a Options) -> impl Iterator<Item = RegistrationEntry> + 'a {
        let explicit = options
            .handlers()
            .iter()
            .map(|(component, lifetime)| (component, *lifetime));
        let scanned = options.assembly().into_iter().flat_map(|(assembly, lifetime)| {
            assembly
                .types()
                .iter()
                .filter(|component| component.is_handler() && !component.is_decorator())
                .map(move |component| (component, lifetime))
        });

        explicit.chain(scanned).flat_map(|(component, lifetime)| {
            component.handler_bindings().map(move |binding| {
                RegistrationEntry::new(binding.clone(), component.type_info(), lifetime)
            })
        })
    }
}
