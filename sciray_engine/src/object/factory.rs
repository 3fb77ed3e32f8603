/// EngineFactory - name-keyed registry of polymorphic engine objects
///
/// A factory for base `T` (e.g. `dyn Camera`) maps type names to handlers
/// able to instantiate, describe (JSON schema), serialize and deserialize
/// one concrete type. Concrete types must be upcastable to `T`, default
/// constructible and serde (de)serializable, all checked at compile time by
/// `register_type`.

use std::any::TypeId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use crate::engine_err;
use crate::error::Result;
use crate::object::camera::Camera;
use crate::object::engine_object::EngineObject;
use crate::object::light::Light;
use crate::object::material::Material;
use crate::object::renderer::Renderer;

// ===== UPCAST =====

/// Conversion of a concrete engine object into the factory base type
pub trait Upcast<T: ?Sized> {
    fn upcast(self: Box<Self>) -> Box<T>;
}

macro_rules! impl_upcast {
    ($($base:ident),*) => {
        $(
            impl<D: $base + 'static> Upcast<dyn $base> for D {
                fn upcast(self: Box<Self>) -> Box<dyn $base> {
                    self
                }
            }
        )*
    };
}

impl_upcast!(Camera, Light, Material, Renderer);

// ===== HANDLER =====

struct TypeHandler<T: ?Sized> {
    name: String,
    type_id: TypeId,
    instantiate: fn() -> Box<T>,
    schema: fn() -> Value,
    serialize: fn(&T) -> Result<Value>,
    deserialize: fn(Value) -> Result<Box<T>>,
}

fn instantiate<T: ?Sized, D: Upcast<T> + Default>() -> Box<T> {
    <D as Upcast<T>>::upcast(Box::new(D::default()))
}

fn schema_of<D: EngineObject + Default>() -> Value {
    D::default().schema()
}

fn serialize<T: ?Sized + EngineObject, D: EngineObject + Serialize + 'static>(object: &T) -> Result<Value> {
    let concrete = object.as_any().downcast_ref::<D>()
        .ok_or_else(|| engine_err!("sciray::EngineFactory", "Type mismatch during serialization"))?;
    Ok(serde_json::to_value(concrete)?)
}

fn deserialize<T: ?Sized, D: Upcast<T> + DeserializeOwned>(json: Value) -> Result<Box<T>> {
    let concrete: D = serde_json::from_value(json)?;
    Ok(<D as Upcast<T>>::upcast(Box::new(concrete)))
}

// ===== FACTORY =====

pub struct EngineFactory<T: ?Sized> {
    handlers: Vec<TypeHandler<T>>,
}

impl<T: ?Sized + EngineObject> EngineFactory<T> {
    pub fn new() -> Self {
        Self { handlers: Vec::new() }
    }

    /// Register `D` under `name`, replacing any previous type of that name
    pub fn register_type<D>(&mut self, name: &str) -> &mut Self
    where
        D: EngineObject + Upcast<T> + Default + Serialize + DeserializeOwned + 'static,
    {
        let handler = TypeHandler {
            name: name.to_string(),
            type_id: TypeId::of::<D>(),
            instantiate: instantiate::<T, D>,
            schema: schema_of::<D>,
            serialize: serialize::<T, D>,
            deserialize: deserialize::<T, D>,
        };

        match self.handlers.iter_mut().find(|existing| existing.name == name) {
            Some(existing) => *existing = handler,
            None => self.handlers.push(handler),
        }
        self
    }

    /// Registered names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.handlers.iter().map(|handler| handler.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Default-constructed instance of the type registered under `name`.
    ///
    /// Fails with NotFound for unknown names.
    pub fn create(&self, name: &str) -> Result<Box<T>> {
        Ok((self.get(name)?.instantiate)())
    }

    /// `default` if `name` is empty, else `create(name)`
    pub fn create_or(&self, name: &str, default: Box<T>) -> Result<Box<T>> {
        if name.is_empty() {
            return Ok(default);
        }
        self.create(name)
    }

    /// `{"oneOf": [...]}` over every registered type, in registration order
    pub fn get_factory_schema(&self) -> Value {
        let schemas: Vec<Value> = self.handlers.iter()
            .map(|handler| (handler.schema)())
            .collect();
        json!({ "oneOf": schemas })
    }

    /// Schema of a single registered type
    pub fn schema_of(&self, name: &str) -> Result<Value> {
        Ok((self.get(name)?.schema)())
    }

    /// Registered name of an object's concrete type
    pub fn name_of(&self, object: &T) -> Result<&str> {
        Ok(self.handler_for(object)?.name.as_str())
    }

    /// Serialize the parameters of an object
    pub fn serialize(&self, object: &T) -> Result<Value> {
        (self.handler_for(object)?.serialize)(object)
    }

    /// `{"name": ..., "params": ...}` of an object
    pub fn serialize_named(&self, object: &T) -> Result<Value> {
        let handler = self.handler_for(object)?;
        let params = (handler.serialize)(object)?;
        Ok(json!({ "name": handler.name, "params": params }))
    }

    /// Replace the parameters of `object` with `json`.
    ///
    /// The backend handle is kept and the object is marked modified.
    /// Missing fields take their default value.
    pub fn deserialize(&self, json: Value, object: &mut Box<T>) -> Result<()> {
        let handler = self.handler_for(&**object)?;
        let mut fresh = (handler.deserialize)(json)?;
        std::mem::swap(fresh.state_mut(), object.state_mut());
        *object = fresh;
        object.mark_modified();
        Ok(())
    }

    /// New instance of `name` built from `json`
    pub fn deserialize_object(&self, name: &str, json: Value) -> Result<Box<T>> {
        (self.get(name)?.deserialize)(json)
    }

    fn find(&self, name: &str) -> Option<&TypeHandler<T>> {
        self.handlers.iter().find(|handler| handler.name == name)
    }

    fn get(&self, name: &str) -> Result<&TypeHandler<T>> {
        self.find(name)
            .ok_or_else(|| engine_err!("sciray::EngineFactory", NotFound => "Unknown type name '{}'", name))
    }

    fn handler_for(&self, object: &T) -> Result<&TypeHandler<T>> {
        let type_id = object.as_any().type_id();
        self.handlers.iter()
            .find(|handler| handler.type_id == type_id)
            .ok_or_else(|| engine_err!("sciray::EngineFactory", NotFound =>
                "Type '{}' is not registered", object.backend_subtype()))
    }
}

impl<T: ?Sized + EngineObject> Default for EngineFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;
