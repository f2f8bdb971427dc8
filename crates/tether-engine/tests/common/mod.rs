//! Shared host fixtures and a closure-backed script runtime

#![allow(dead_code)]

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tether_engine::{
    BridgeContext, BridgeContextBuilder, RuntimeFault, ScriptRuntime, ScriptValue, WrapPipeline, WrapScope,
};
use tether_sdk::{HostClass, HostError, HostObject, HostRef, HostValue, ValueType};

// ============================================================================
// Person / Address
// ============================================================================

pub struct Address {
    pub city: String,
}

pub static ADDRESS: Lazy<HostClass> = Lazy::new(|| {
    HostClass::builder::<Address>("demo.model.Address")
        .field("city", ValueType::Str, |a| Ok(a.city.as_str().into()))
        .build()
});

impl HostObject for Address {
    fn host_class(&self) -> &'static HostClass {
        &ADDRESS
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct Person {
    pub name: Mutex<String>,
    pub age: Mutex<i64>,
    pub address: HostValue,
}

pub static PERSON: Lazy<HostClass> = Lazy::new(|| {
    HostClass::builder::<Person>("demo.model.Person")
        .field_mut(
            "name",
            ValueType::Str,
            |p| Ok(p.name.lock().as_str().into()),
            |p, v| {
                *p.name.lock() = v.as_str().unwrap_or_default().to_string();
                Ok(())
            },
        )
        .getter("age", ValueType::Int, |p| Ok((*p.age.lock()).into()))
        .setter("age", ValueType::Int, |p, v| {
            let age = v.as_int().unwrap_or_default();
            if age < 0 {
                return Err(HostError::ArgumentError("age must not be negative".to_string()));
            }
            *p.age.lock() = age;
            Ok(())
        })
        .field("address", ValueType::Object(Some("demo.model.Address")), |p| Ok(p.address.clone()))
        .function("greet", &[ValueType::Str], ValueType::Str, |p, args| {
            Ok(format!("Hello {}, I am {}", args[0], p.name.lock()).into())
        })
        .build()
});

impl HostObject for Person {
    fn host_class(&self) -> &'static HostClass {
        &PERSON
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn display(&self) -> String {
        format!("Person({})", self.name.lock())
    }
}

pub fn person(name: &str, age: i64) -> Arc<Person> {
    Arc::new(Person {
        name: Mutex::new(name.to_string()),
        age: Mutex::new(age),
        address: HostValue::object(Address {
            city: "Brno".to_string(),
        }),
    })
}

// ============================================================================
// Animal / Dog (inheritance by composition)
// ============================================================================

pub struct Animal {
    pub name: String,
}

pub static ANIMAL: Lazy<HostClass> = Lazy::new(|| {
    HostClass::builder::<Animal>("demo.zoo.Animal")
        .field("name", ValueType::Str, |a| Ok(a.name.as_str().into()))
        .function("speak", &[], ValueType::Str, |_, _| Ok("...".into()))
        .function("describe", &[], ValueType::Str, |a, _| Ok(format!("animal {}", a.name).into()))
        .build()
});

impl HostObject for Animal {
    fn host_class(&self) -> &'static HostClass {
        &ANIMAL
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct Dog {
    pub animal: Animal,
    pub breed: String,
}

pub static DOG: Lazy<HostClass> = Lazy::new(|| {
    HostClass::builder::<Dog>("demo.zoo.Dog")
        .extends(&ANIMAL, |d| &d.animal)
        .field("breed", ValueType::Str, |d| Ok(d.breed.as_str().into()))
        .function("speak", &[], ValueType::Str, |_, _| Ok("Woof".into()))
        .function("fetch", &[ValueType::Str], ValueType::Str, |d, args| {
            Ok(format!("{} fetched the {}", d.animal.name, args[0]).into())
        })
        .build()
});

impl HostObject for Dog {
    fn host_class(&self) -> &'static HostClass {
        &DOG
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn dog() -> Arc<Dog> {
    Arc::new(Dog {
        animal: Animal {
            name: "Rex".to_string(),
        },
        breed: "Beagle".to_string(),
    })
}

// ============================================================================
// Calc (overloads)
// ============================================================================

pub struct Calc;

pub static CALC: Lazy<HostClass> = Lazy::new(|| {
    HostClass::builder::<Calc>("demo.calc.Calc")
        .function("f", &[ValueType::Str], ValueType::Str, |_, _| Ok("string".into()))
        .function("f", &[ValueType::Number], ValueType::Str, |_, _| Ok("number".into()))
        .function("pick", &[ValueType::Int], ValueType::Str, |_, _| Ok("int".into()))
        .function("pick", &[ValueType::Float], ValueType::Str, |_, _| Ok("float".into()))
        .function("half", &[ValueType::Float], ValueType::Float, |_, args| {
            match args[0] {
                HostValue::Float(x) => Ok(HostValue::Float(x / 2.0)),
                ref other => Err(HostError::mismatch("Float", other.type_name())),
            }
        })
        .function("mix", &[ValueType::Int, ValueType::Any], ValueType::Str, |_, _| Ok("int-any".into()))
        .function("mix", &[ValueType::Any, ValueType::Str], ValueType::Str, |_, _| Ok("any-str".into()))
        .function("fail", &[], ValueType::Void, |_, _| Err(HostError::failed("calculator jammed")))
        .build()
});

impl HostObject for Calc {
    fn host_class(&self) -> &'static HostClass {
        &CALC
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Triple / Fragile (inspection)
// ============================================================================

pub struct Triple;

pub static TRIPLE: Lazy<HostClass> = Lazy::new(|| {
    HostClass::builder::<Triple>("demo.model.Triple")
        .field("c", ValueType::Int, |_| Ok(1.into()))
        .field("a", ValueType::Int, |_| Ok(2.into()))
        .field("b", ValueType::Int, |_| Ok(3.into()))
        .build()
});

impl HostObject for Triple {
    fn host_class(&self) -> &'static HostClass {
        &TRIPLE
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct Fragile;

pub static FRAGILE: Lazy<HostClass> = Lazy::new(|| {
    HostClass::builder::<Fragile>("demo.model.Fragile")
        .field("ok", ValueType::Int, |_| Ok(1.into()))
        .getter("broken", ValueType::Int, |_| Err(HostError::failed("sensor offline")))
        .field("zeta", ValueType::Str, |_| Ok("last".into()))
        .build()
});

impl HostObject for Fragile {
    fn host_class(&self) -> &'static HostClass {
        &FRAGILE
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Secret / SecretView / Ping / Pong (adapters)
// ============================================================================

pub struct Secret {
    pub token: String,
}

pub static SECRET: Lazy<HostClass> = Lazy::new(|| {
    HostClass::builder::<Secret>("demo.secure.Secret")
        .field("token", ValueType::Str, |s| Ok(s.token.as_str().into()))
        .build()
});

impl HostObject for Secret {
    fn host_class(&self) -> &'static HostClass {
        &SECRET
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct SecretView {
    pub masked: String,
}

pub static SECRET_VIEW: Lazy<HostClass> = Lazy::new(|| {
    HostClass::builder::<SecretView>("demo.secure.SecretView")
        .field("masked", ValueType::Str, |s| Ok(s.masked.as_str().into()))
        .build()
});

impl HostObject for SecretView {
    fn host_class(&self) -> &'static HostClass {
        &SECRET_VIEW
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn mask_secret(object: &HostRef) -> HostValue {
    let len = object
        .as_any()
        .downcast_ref::<Secret>()
        .map(|s| s.token.len())
        .unwrap_or_default();
    HostValue::object(SecretView {
        masked: "*".repeat(len),
    })
}

pub struct Ping;
pub struct Pong;

pub static PING: Lazy<HostClass> = Lazy::new(|| HostClass::builder::<Ping>("demo.loop.Ping").build());
pub static PONG: Lazy<HostClass> = Lazy::new(|| HostClass::builder::<Pong>("demo.loop.Pong").build());

impl HostObject for Ping {
    fn host_class(&self) -> &'static HostClass {
        &PING
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl HostObject for Pong {
    fn host_class(&self) -> &'static HostClass {
        &PONG
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Contexts
// ============================================================================

pub const GRANTED: &[&str] = &[
    "demo.model.Person",
    "demo.model.Address",
    "demo.zoo.Animal",
    "demo.zoo.Dog",
    "demo.calc.Calc",
    "demo.model.Triple",
    "demo.model.Fragile",
    "demo.secure.Secret",
    "demo.secure.SecretView",
    "tether.List",
    "tether.Map",
];

pub fn builder() -> BridgeContextBuilder {
    GRANTED.iter().fold(BridgeContext::builder(), |b, name| b.grant(*name))
}

pub fn context() -> Arc<BridgeContext> {
    Arc::new(builder().build())
}

pub fn object(value: impl HostObject) -> HostValue {
    HostValue::object(value)
}

// ============================================================================
// Test runtime
// ============================================================================

/// Script body: receives the wrapped global object and the execution scope
pub type Program = dyn Fn(Option<&ScriptValue>, &WrapScope) -> Result<ScriptValue, RuntimeFault>;

/// Runtime whose "sources" are keys of registered Rust closures
#[derive(Default)]
pub struct TestRuntime {
    programs: HashMap<String, Rc<Program>>,
    globals: RefCell<HashMap<String, ScriptValue>>,
    hook: Option<Arc<WrapPipeline>>,
    depth: Cell<i32>,
    entered: Cell<usize>,
}

impl TestRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `body` as the program compiled from `source`
    pub fn program<F>(mut self, source: &str, body: F) -> Self
    where
        F: Fn(Option<&ScriptValue>, &WrapScope) -> Result<ScriptValue, RuntimeFault> + 'static,
    {
        self.programs.insert(source.to_string(), Rc::new(body));
        self
    }

    /// Bind a global name
    pub fn define(&self, name: &str, value: ScriptValue) {
        self.globals.borrow_mut().insert(name.to_string(), value);
    }

    /// Currently open execution contexts
    pub fn depth(&self) -> i32 {
        self.depth.get()
    }

    /// Total number of `enter` calls
    pub fn entered(&self) -> usize {
        self.entered.get()
    }

    pub fn has_hook(&self) -> bool {
        self.hook.is_some()
    }
}

impl ScriptRuntime for TestRuntime {
    type Script = Rc<Program>;

    fn install_wrap_hook(&mut self, pipeline: Arc<WrapPipeline>) {
        self.hook = Some(pipeline);
    }

    fn enter(&self) {
        self.depth.set(self.depth.get() + 1);
        self.entered.set(self.entered.get() + 1);
    }

    fn exit(&self) {
        self.depth.set(self.depth.get() - 1);
    }

    fn compile(&self, source: &str, source_name: &str) -> Result<Self::Script, RuntimeFault> {
        self.programs
            .get(source)
            .cloned()
            .ok_or_else(|| RuntimeFault::new(format!("syntax error near '{}'", source)).at(source_name, 1, 1))
    }

    fn execute(
        &self,
        script: &Self::Script,
        global: Option<&ScriptValue>,
        scope: &WrapScope,
    ) -> Result<ScriptValue, RuntimeFault> {
        script(global, scope)
    }

    fn global(&self, name: &str, _scope: &WrapScope) -> Option<ScriptValue> {
        self.globals.borrow().get(name).cloned()
    }

    fn call(
        &self,
        callee: &ScriptValue,
        _this: Option<&ScriptValue>,
        args: &[ScriptValue],
        scope: &WrapScope,
    ) -> Result<ScriptValue, RuntimeFault> {
        let ScriptValue::Function(function) = callee else {
            return Err(RuntimeFault::new(format!("{} is not a function", callee)));
        };
        scope.call_function(function, args)
    }
}
