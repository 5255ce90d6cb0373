use indexmap::IndexMap;

use crate::entries::{
    Class, Constant, Enumeration, EnumerationOwner, Function, GlobalVariable, Owner, TypeAlias,
};
use crate::namespace::{Header, Namespace, canonical_namespace};

/// Root aggregate: headers, their namespaces and every attached element.
///
/// Elements only enter through the `add_*` methods, which create the header
/// and namespace on first use and stamp the element's [`Owner`]. A second
/// element with the same name in the same namespace replaces the first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SymbolTable {
    headers: IndexMap<String, Header>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headers(&self) -> impl Iterator<Item = &Header> {
        self.headers.values()
    }

    pub fn enabled_headers(&self) -> impl Iterator<Item = &Header> {
        self.headers.values().filter(|header| header.enabled)
    }

    pub fn header(&self, name: &str) -> Option<&Header> {
        self.headers.get(name)
    }

    pub fn header_count(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Fetch or create a header (enabled by default).
    pub fn ensure_header(&mut self, name: &str) -> &mut Header {
        self.headers
            .entry(name.to_string())
            .or_insert_with(|| Header::new(name))
    }

    pub fn set_header_enabled(&mut self, name: &str, enabled: bool) {
        self.ensure_header(name).enabled = enabled;
    }

    fn resolve(&mut self, header: &str, namespace: &str) -> (Owner, &mut Namespace) {
        let canonical = canonical_namespace(namespace);
        let owner = Owner::new(header, canonical.clone());
        let namespace = self.ensure_header(header).namespace_mut(&canonical);
        (owner, namespace)
    }

    pub fn add_constant(&mut self, mut constant: Constant, header: &str, namespace: &str) {
        let (owner, ns) = self.resolve(header, namespace);
        constant.owner = Some(owner);
        ns.constants.insert(constant.name.clone(), constant);
    }

    pub fn add_enumeration(&mut self, mut enumeration: Enumeration, header: &str, namespace: &str) {
        let (owner, ns) = self.resolve(header, namespace);
        enumeration.owner = EnumerationOwner::Namespace(owner);
        ns.enumerations
            .insert(enumeration.name.clone(), enumeration);
    }

    pub fn add_type_alias(&mut self, mut alias: TypeAlias, header: &str, namespace: &str) {
        let (owner, ns) = self.resolve(header, namespace);
        alias.owner = Some(owner);
        ns.type_aliases.insert(alias.name.clone(), alias);
    }

    pub fn add_global_variable(
        &mut self,
        mut variable: GlobalVariable,
        header: &str,
        namespace: &str,
    ) {
        let (owner, ns) = self.resolve(header, namespace);
        variable.owner = Some(owner);
        ns.variables.insert(variable.name.clone(), variable);
    }

    pub fn add_function(&mut self, mut function: Function, header: &str, namespace: &str) {
        let (owner, ns) = self.resolve(header, namespace);
        function.owner = Some(owner);
        function.class = None;
        ns.functions.insert(function.name.clone(), function);
    }

    pub fn add_class(&mut self, mut class: Class, header: &str, namespace: &str) {
        let (owner, ns) = self.resolve(header, namespace);
        class.attach(&owner);
        ns.classes.insert(class.name.clone(), class);
    }

    pub fn class_mut(&mut self, header: &str, namespace: &str, name: &str) -> Option<&mut Class> {
        self.headers
            .get_mut(header)?
            .namespaces
            .get_mut(&canonical_namespace(namespace))?
            .classes
            .get_mut(name)
    }

    /// Every namespace paired with its header, in table order.
    pub fn namespaces(&self) -> impl Iterator<Item = (&Header, &Namespace)> {
        self.headers
            .values()
            .flat_map(|header| header.namespaces.values().map(move |ns| (header, ns)))
    }

    pub fn classes(&self) -> impl Iterator<Item = &Class> {
        self.namespaces().flat_map(|(_, ns)| ns.classes.values())
    }

    pub fn enumerations(&self) -> impl Iterator<Item = &Enumeration> {
        self.namespaces().flat_map(|(_, ns)| {
            ns.enumerations
                .values()
                .chain(ns.classes.values().flat_map(|c| c.enumerations.values()))
        })
    }

    pub fn type_aliases(&self) -> impl Iterator<Item = &TypeAlias> {
        self.namespaces().flat_map(|(_, ns)| ns.type_aliases.values())
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.namespaces().flat_map(|(_, ns)| ns.functions.values())
    }

    /// First class with this (unqualified) name in any header.
    pub fn find_class(&self, name: &str) -> Option<&Class> {
        self.classes().find(|class| class.name == name)
    }

    pub fn counts(&self) -> SymbolCounts {
        let mut counts = SymbolCounts::default();
        for header in self.headers.values() {
            counts += header_counts(header);
        }
        counts
    }
}

/// Element totals for a single header.
pub fn header_counts(header: &Header) -> SymbolCounts {
    let mut counts = SymbolCounts::default();
    for ns in header.namespaces.values() {
        counts.constants += ns.constants.len();
        counts.enumerations += ns.enumerations.len();
        counts.type_aliases += ns.type_aliases.len();
        counts.variables += ns.variables.len();
        counts.functions += ns.functions.len();
        counts.classes += ns.classes.len();
        for class in ns.classes.values() {
            counts.enumerations += class.enumerations.len();
            counts.methods += class.methods.len();
        }
    }
    counts
}

/// Element totals across a table, as shown by `wrapgen inspect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SymbolCounts {
    pub constants: usize,
    pub enumerations: usize,
    pub type_aliases: usize,
    pub variables: usize,
    pub functions: usize,
    pub classes: usize,
    pub methods: usize,
}

impl std::ops::AddAssign for SymbolCounts {
    fn add_assign(&mut self, other: Self) {
        self.constants += other.constants;
        self.enumerations += other.enumerations;
        self.type_aliases += other.type_aliases;
        self.variables += other.variables;
        self.functions += other.functions;
        self.classes += other.classes;
        self.methods += other.methods;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::ROOT_NAMESPACE;
    use crate::types::TypeDescriptor;

    #[test]
    fn root_spellings_share_one_namespace() {
        let mut table = SymbolTable::new();
        table.add_constant(Constant::new("A", "1"), "h.h", "");
        table.add_constant(Constant::new("B", "2"), "h.h", ROOT_NAMESPACE);
        table.add_constant(Constant::new("C", "3"), "h.h", "::");

        let header = table.header("h.h").unwrap();
        assert_eq!(header.namespaces.len(), 1);
        let ns = header.namespace("").unwrap();
        assert!(ns.is_global());
        assert_eq!(ns.constants.len(), 3);
    }

    #[test]
    fn named_namespace_is_not_global() {
        let mut table = SymbolTable::new();
        table.add_constant(Constant::new("A", "1"), "h.h", "gfx");
        let ns = table.header("h.h").unwrap().namespace("gfx").unwrap();
        assert!(!ns.is_global());
    }

    #[test]
    fn re_adding_attaches_to_existing_namespace() {
        let mut table = SymbolTable::new();
        table.add_constant(Constant::new("A", "1"), "h.h", "gfx");
        table.add_function(Function::new("draw"), "h.h", "gfx");
        let ns = table.header("h.h").unwrap().namespace("gfx").unwrap();
        assert!(ns.has_constants());
        assert!(ns.has_functions());
    }

    #[test]
    fn duplicate_name_last_write_wins() {
        let mut table = SymbolTable::new();
        table.add_constant(Constant::new("MAX", "1"), "h.h", "");
        table.add_constant(Constant::new("MAX", "2"), "h.h", "");
        let ns = table.header("h.h").unwrap().namespace("").unwrap();
        assert_eq!(ns.constants.len(), 1);
        assert_eq!(ns.constants["MAX"].value, "2");
    }

    #[test]
    fn owner_back_references_are_stamped() {
        let mut table = SymbolTable::new();
        let mut class = Class::new("Point");
        class.add_method(Function::new("Length"));
        table.add_class(class, "geo.h", "geo");
        table.add_enumeration(Enumeration::with_options("Side", ["L", "R"]), "geo.h", "");

        let class = table.find_class("Point").unwrap();
        let owner = Owner::new("geo.h", "geo");
        assert_eq!(class.owner.as_ref(), Some(&owner));
        assert_eq!(class.methods["Length"].owner.as_ref(), Some(&owner));

        let ns = table.header("geo.h").unwrap().namespace("").unwrap();
        assert_eq!(
            ns.enumerations["Side"].owner,
            EnumerationOwner::Namespace(Owner::new("geo.h", ROOT_NAMESPACE))
        );
    }

    #[test]
    fn header_queries_aggregate_namespaces() {
        let mut table = SymbolTable::new();
        table.add_type_alias(
            TypeAlias::new("size_type", TypeDescriptor::parse("unsigned long")),
            "h.h",
            "a",
        );
        table.add_global_variable(
            GlobalVariable::new("g_count", TypeDescriptor::parse("int")),
            "h.h",
            "b",
        );
        let header = table.header("h.h").unwrap();
        assert!(header.has_type_aliases());
        assert!(header.has_variables());
        assert!(!header.has_classes());
        assert!(!header.has_constants());
    }

    #[test]
    fn disabled_header_survives_without_elements() {
        let mut table = SymbolTable::new();
        table.set_header_enabled("legacy.h", false);
        assert_eq!(table.header_count(), 1);
        assert!(!table.header("legacy.h").unwrap().enabled);
        assert_eq!(table.enabled_headers().count(), 0);
    }
}
