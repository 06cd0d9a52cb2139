//! Named component factories.

use std::sync::Arc;

use arcstr::ArcStr;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::components;
use crate::error::{Error, Result};
use crate::{Component, Context};

/// A type-erased component factory taking JSON parameters.
pub type Factory = Arc<dyn Fn(&Context, Value) -> Result<Arc<Component>> + Send + Sync>;

/// A mapping from names to component factories.
#[derive(Clone)]
pub struct Registry {
    factories: IndexMap<ArcStr, Factory>,
}

/// A reference to a component: a registered factory with parameters,
/// or an already built cell.
#[derive(Debug, Clone)]
pub enum ComponentSpec {
    /// A registered factory and its parameters (a JSON object or null).
    Factory {
        /// The factory name.
        name: ArcStr,
        /// The factory parameters.
        params: Value,
    },
    /// A prebuilt cell.
    Cell(Arc<Component>),
}

impl ComponentSpec {
    /// A factory with default parameters.
    pub fn factory(name: impl Into<ArcStr>) -> Self {
        Self::Factory {
            name: name.into(),
            params: Value::Null,
        }
    }

    /// A factory with the given parameters.
    pub fn with_params(name: impl Into<ArcStr>, params: Value) -> Self {
        Self::Factory {
            name: name.into(),
            params,
        }
    }
}

impl From<&str> for ComponentSpec {
    fn from(value: &str) -> Self {
        Self::factory(value)
    }
}

impl From<Arc<Component>> for ComponentSpec {
    fn from(value: Arc<Component>) -> Self {
        Self::Cell(value)
    }
}

/// Merges two JSON parameter objects; keys in `overrides` win.
///
/// `null` is treated as an empty object.
pub(crate) fn merge_params(base: &Value, overrides: &Value) -> Result<Value> {
    let mut merged = as_object(base)?;
    merged.extend(as_object(overrides)?);
    Ok(Value::Object(merged))
}

fn as_object(value: &Value) -> Result<serde_json::Map<String, Value>> {
    match value {
        Value::Null => Ok(Default::default()),
        Value::Object(map) => Ok(map.clone()),
        other => Err(Error::config(format!(
            "component parameters must be an object, got `{other}`"
        ))),
    }
}

/// Sets `key` to `value` unless `params` already has it.
fn with_default(params: Value, key: &str, value: Value) -> Result<Value> {
    let mut params = as_object(&params)?;
    params.entry(key).or_insert(value);
    Ok(Value::Object(params))
}

impl Registry {
    /// A registry with no factories.
    pub fn empty() -> Self {
        Self {
            factories: IndexMap::new(),
        }
    }

    /// Registers a factory taking raw JSON parameters, replacing any
    /// factory of the same name.
    pub fn register(
        &mut self,
        name: impl Into<ArcStr>,
        factory: impl Fn(&Context, Value) -> Result<Arc<Component>> + Send + Sync + 'static,
    ) {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Registers a factory with a typed parameter schema.
    ///
    /// Parameters are deserialized into `P`; unknown or mistyped
    /// parameters are configuration errors.
    pub fn register_typed<P: DeserializeOwned + 'static>(
        &mut self,
        name: impl Into<ArcStr>,
        factory: fn(&Context, &P) -> Result<Arc<Component>>,
    ) {
        let name = name.into();
        let factory_name = name.clone();
        self.register(name, move |ctx, params| {
            let params: P = parse_params(&factory_name, params)?;
            factory(ctx, &params)
        });
    }

    /// Looks up a factory by name.
    pub fn get(&self, name: &str) -> Result<&Factory> {
        self.factories
            .get(name)
            .ok_or_else(|| Error::config(format!("no component factory named `{name}`")))
    }

    /// Returns `true` if a factory named `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// The registered factory names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &ArcStr> {
        self.factories.keys()
    }
}

fn parse_params<P: DeserializeOwned>(factory: &str, params: Value) -> Result<P> {
    let params = if params.is_null() {
        Value::Object(Default::default())
    } else {
        params
    };
    serde_json::from_value(params)
        .map_err(|e| Error::config(format!("invalid parameters for `{factory}`: {e}")))
}

impl Default for Registry {
    /// The built-in component library.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register_typed("straight", components::straight);
        registry.register_typed("bend_euler", components::bend_euler);
        registry.register("bend_euler180", |ctx, params| {
            let params = with_default(params, "angle", Value::from(180.))?;
            components::bend_euler(ctx, &parse_params("bend_euler180", params)?)
        });
        registry.register_typed("bend_circular", components::bend_circular);
        registry.register_typed("bend_euler_s", components::bend_euler_s);
        registry.register_typed("bend_straight_bend", components::bend_straight_bend);
        registry.register_typed("wire_corner", components::wire_corner);
        registry.register_typed("taper", components::taper);
        registry.register_typed("pad", components::pad);
        registry.register_typed("pad_array", components::pad_array);
        registry.register_typed("via_stack", components::via_stack);
        registry.register_typed(
            "straight_heater_metal_undercut",
            components::straight_heater_metal_undercut,
        );
        registry.register("straight_heater_metal", |ctx, params| {
            let params = with_default(params, "with_undercut", Value::from(false))?;
            components::straight_heater_metal_undercut(
                ctx,
                &parse_params("straight_heater_metal", params)?,
            )
        });
        registry
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use test_log::test;

    use super::*;
    use crate::pdk::Pdk;

    fn ctx() -> Context {
        Context::new(Pdk::generic().unwrap())
    }

    #[test]
    fn builtins_are_registered() {
        let registry = Registry::default();
        for name in [
            "straight",
            "bend_euler",
            "bend_euler180",
            "bend_circular",
            "bend_euler_s",
            "bend_straight_bend",
            "wire_corner",
            "taper",
            "pad",
            "pad_array",
            "via_stack",
            "straight_heater_metal_undercut",
            "straight_heater_metal",
        ] {
            assert!(registry.contains(name), "{name}");
        }
    }

    #[test]
    fn overrides_take_precedence() {
        let merged = merge_params(&json!({"length": 5.0, "width": 1.0}), &json!({"length": 7.0}))
            .unwrap();
        assert_eq!(merged, json!({"length": 7.0, "width": 1.0}));
        assert!(merge_params(&json!(3), &Value::Null).is_err());
    }

    #[test]
    fn unknown_parameters_are_rejected() {
        let ctx = ctx();
        let spec = ComponentSpec::with_params("straight", json!({"lenght": 5.0}));
        let err = ctx.get_component(&spec, &Value::Null).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("straight"));

        let err = ctx
            .get_component(&ComponentSpec::factory("mmi1x2"), &Value::Null)
            .unwrap_err();
        assert!(err.to_string().contains("mmi1x2"));
    }

    #[test]
    fn identical_parameters_share_a_cell() {
        let ctx = ctx();
        let a = ctx
            .get_component(&"straight".into(), &json!({"length": 5.0}))
            .unwrap();
        let b = ctx
            .get_component(
                &ComponentSpec::with_params("straight", json!({"length": 5.0})),
                &Value::Null,
            )
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.name().starts_with("straight_"));

        let c = ctx
            .get_component(&"straight".into(), &json!({"length": 6.0}))
            .unwrap();
        assert_ne!(a.name(), c.name());
    }

    #[test]
    fn presets_fill_defaults() {
        let ctx = ctx();
        let bend = ctx
            .get_component(&"bend_euler180".into(), &Value::Null)
            .unwrap();
        assert_eq!(bend.port("o2").unwrap().orientation(), Some(180.));

        let custom = ctx
            .get_component(&"bend_euler180".into(), &json!({"angle": 90.0}))
            .unwrap();
        assert_eq!(custom.port("o2").unwrap().orientation(), Some(90.));
    }

    #[test]
    fn prebuilt_cells_pass_through() {
        let ctx = ctx();
        let cell = Arc::new(Component::new("custom"));
        let spec = ComponentSpec::from(cell.clone());
        let got = ctx.get_component(&spec, &json!({"length": 1.0})).unwrap();
        assert!(Arc::ptr_eq(&cell, &got));
    }
}
