//! Decorator locator: one entry per (decorator type, decorator contract), in configuration order.

use crate::config::Options;

use super::entry::RegistrationEntry;

/// Open decorators yield one generic-definition entry per declared shape.
#[derive(Debug, Default, Clone, Copy)]
pub struct DecoratorLocator;

impl DecoratorLocator {
    pub fn locate<'a>(&self, options: &'a Options) -> impl Iterator<Item = RegistrationEntry> + 'a {
        options
            .decorators()
            .iter()
            .flat_map(|(component, lifetime)| {
                component.decorator_bindings().map(move |binding| {
                    RegistrationEntry::new(binding.clone(), component.type_info(), *lifetime)
                })
            })
    }
}
