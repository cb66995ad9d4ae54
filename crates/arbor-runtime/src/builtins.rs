//! Builtin types shared by every module loaded into a [`Context`](crate::Context).
//!
//! The registry is owned by the context and handed to whatever needs a builtin type
//! reference, nothing looks it up through global state.

use smol_str::SmolStr;

use crate::{
    Shared,
    types::{Atom, AtomConstructor, Type},
    value::Value,
};

#[derive(Debug, Clone)]
pub struct Builtins {
    any: Shared<Type>,
    nothing: Shared<Type>,
    boolean: Shared<Type>,
    integer: Shared<Type>,
    float: Shared<Type>,
    text: Shared<Type>,
    array: Shared<Type>,
    function: Shared<Type>,
    date: Shared<Type>,
    time_of_day: Shared<Type>,
    date_time: Shared<Type>,
    time_zone: Shared<Type>,
    compile_error: Shared<AtomConstructor>,
}

impl Default for Builtins {
    fn default() -> Self {
        Self::new()
    }
}

impl Builtins {
    pub fn new() -> Self {
        let builtin = |name: &str| Shared::new(Type::builtin(name));
        let compile_error_type = builtin("Standard.Base.Error.Compile_Error");

        Self {
            any: builtin("Standard.Base.Any.Any"),
            nothing: builtin("Standard.Base.Nothing.Nothing"),
            boolean: builtin("Standard.Base.Data.Boolean.Boolean"),
            integer: builtin("Standard.Base.Data.Numbers.Integer"),
            float: builtin("Standard.Base.Data.Numbers.Float"),
            text: builtin("Standard.Base.Data.Text.Text"),
            array: builtin("Standard.Base.Data.Array.Array"),
            function: builtin("Standard.Base.Function.Function"),
            date: builtin("Standard.Base.Data.Time.Date.Date"),
            time_of_day: builtin("Standard.Base.Data.Time.Time_Of_Day.Time_Of_Day"),
            date_time: builtin("Standard.Base.Data.Time.Date_Time.Date_Time"),
            time_zone: builtin("Standard.Base.Data.Time.Time_Zone.Time_Zone"),
            compile_error: Shared::new(AtomConstructor::new(
                "Error",
                compile_error_type,
                ["message"],
            )),
        }
    }

    pub fn any(&self) -> &Shared<Type> {
        &self.any
    }

    pub fn nothing(&self) -> &Shared<Type> {
        &self.nothing
    }

    pub fn boolean(&self) -> &Shared<Type> {
        &self.boolean
    }

    pub fn integer(&self) -> &Shared<Type> {
        &self.integer
    }

    pub fn float(&self) -> &Shared<Type> {
        &self.float
    }

    pub fn text(&self) -> &Shared<Type> {
        &self.text
    }

    pub fn array(&self) -> &Shared<Type> {
        &self.array
    }

    pub fn function(&self) -> &Shared<Type> {
        &self.function
    }

    pub fn date(&self) -> &Shared<Type> {
        &self.date
    }

    pub fn time_of_day(&self) -> &Shared<Type> {
        &self.time_of_day
    }

    pub fn date_time(&self) -> &Shared<Type> {
        &self.date_time
    }

    pub fn time_zone(&self) -> &Shared<Type> {
        &self.time_zone
    }

    pub fn compile_error(&self) -> &Shared<Type> {
        self.compile_error.owner()
    }

    /// Builds the language level value raised when a lazily supplied body fails to compile.
    pub fn make_compile_error(&self, message: impl Into<SmolStr>) -> Value {
        let fields = vec![Value::Text(message.into())];
        Value::Atom(Shared::new(Atom::from_parts(
            Shared::clone(&self.compile_error),
            fields,
        )))
    }
}
