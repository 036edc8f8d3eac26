//! Typed handler invocation
//!
//! Design: A handler value fixes the name, argument tuple and return type at
//! construction. Nothing is checked against the script until `call`.
//!
//! Call path: encode each argument → pack into one list → build event →
//! dispatch → decode the response.

use crate::convert::DescriptorConvertible;
use crate::descriptor::Descriptor;
use crate::dispatch::{dispatch, ScriptResource};
use crate::error::{ConversionError, Error, InvocationError, Result};
use crate::event::EventBuilder;
use crate::stats;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Argument tuples accepted by typed handlers
pub trait HandlerArgs {
    /// Number of logical arguments
    const ARITY: usize;

    /// Encode the arguments, in order, into one list; `None` when there are none
    fn pack(&self) -> std::result::Result<Option<Descriptor>, ConversionError>;
}

impl HandlerArgs for () {
    const ARITY: usize = 0;

    fn pack(&self) -> std::result::Result<Option<Descriptor>, ConversionError> {
        Ok(None)
    }
}

macro_rules! impl_handler_args {
    ($arity:expr; $($name:ident),+) => {
        impl<$($name: DescriptorConvertible),+> HandlerArgs for ($($name,)+) {
            const ARITY: usize = $arity;

            #[allow(non_snake_case)]
            fn pack(&self) -> std::result::Result<Option<Descriptor>, ConversionError> {
                let ($($name,)+) = self;
                let mut list = Descriptor::list();
                $(
                    // index 0 appends
                    list.insert($name.to_descriptor()?, 0);
                )+
                Ok(Some(list))
            }
        }
    };
}

impl_handler_args!(1; A);
impl_handler_args!(2; A, B);
impl_handler_args!(3; A, B, C);
impl_handler_args!(4; A, B, C, D);
impl_handler_args!(5; A, B, C, D, E);
impl_handler_args!(6; A, B, C, D, E, F);
impl_handler_args!(7; A, B, C, D, E, F, G);
impl_handler_args!(8; A, B, C, D, E, F, G, H);

fn conversion_failed(err: ConversionError) -> Error {
    stats::record_conversion_error();
    Error::Conversion(err)
}

fn join_failed(err: tokio::task::JoinError) -> Error {
    Error::Invocation(InvocationError::new(
        InvocationError::SYNTHESIZED,
        format!("blocking handler call did not complete: {}", err),
    ))
}

/// Untyped handler: descriptor in, descriptor out
///
/// Holds the script alive for as long as the handler exists.
pub struct RawHandler<S: ?Sized> {
    script: Arc<S>,
    name: String,
    builder: EventBuilder,
}

impl<S: ?Sized> Clone for RawHandler<S> {
    fn clone(&self) -> Self {
        Self {
            script: Arc::clone(&self.script),
            name: self.name.clone(),
            builder: self.builder,
        }
    }
}

impl<S: ?Sized> fmt::Debug for RawHandler<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawHandler")
            .field("name", &self.name)
            .field("builder", &self.builder)
            .finish_non_exhaustive()
    }
}

impl<S: ScriptResource + ?Sized> RawHandler<S> {
    pub fn new(script: Arc<S>, name: impl Into<String>) -> Self {
        Self {
            script,
            name: name.into(),
            builder: EventBuilder::default(),
        }
    }

    /// Use `builder` for every event this handler sends
    pub fn with_builder(mut self, builder: EventBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn script(&self) -> &Arc<S> {
        &self.script
    }

    /// Invoke the handler with `arguments` as the direct object
    pub fn call(&self, arguments: Option<Descriptor>) -> std::result::Result<Descriptor, InvocationError> {
        let event = self.builder.subroutine_call(&self.name, arguments);
        dispatch(&*self.script, &event)
    }

    /// Attach argument and return types
    pub fn typed<A, R>(self) -> Handler<S, A, R>
    where
        A: HandlerArgs,
        R: DescriptorConvertible,
    {
        Handler {
            raw: self,
            _signature: PhantomData,
        }
    }

    /// Attach argument types; the result will be discarded
    pub fn void<A: HandlerArgs>(self) -> VoidHandler<S, A> {
        VoidHandler {
            raw: self,
            _signature: PhantomData,
        }
    }
}

/// Handler taking `A` and returning `R`
pub struct Handler<S: ?Sized, A, R> {
    raw: RawHandler<S>,
    _signature: PhantomData<fn(A) -> R>,
}

impl<S: ?Sized, A, R> Clone for Handler<S, A, R> {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw.clone(),
            _signature: PhantomData,
        }
    }
}

impl<S: ?Sized, A, R> fmt::Debug for Handler<S, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.raw.name)
            .field("arguments", &std::any::type_name::<A>())
            .field("returns", &std::any::type_name::<R>())
            .finish()
    }
}

impl<S, A, R> Handler<S, A, R>
where
    S: ScriptResource + ?Sized,
    A: HandlerArgs,
    R: DescriptorConvertible,
{
    pub fn name(&self) -> &str {
        self.raw.name()
    }

    pub fn arity(&self) -> usize {
        A::ARITY
    }

    pub fn call(&self, args: A) -> Result<R> {
        let arguments = args.pack().map_err(conversion_failed)?;
        let response = self.raw.call(arguments)?;
        R::from_descriptor(&response).map_err(conversion_failed)
    }

    /// Turn into a plain closure
    pub fn into_fn(self) -> impl Fn(A) -> Result<R> {
        move |args| self.call(args)
    }
}

impl<S, A, R> Handler<S, A, R>
where
    S: ScriptResource + Send + Sync + ?Sized + 'static,
    A: HandlerArgs + Send + 'static,
    R: DescriptorConvertible + Send + 'static,
{
    /// Run the call on the blocking thread pool
    pub async fn call_blocking(&self, args: A) -> Result<R> {
        let handler = self.clone();
        tokio::task::spawn_blocking(move || handler.call(args))
            .await
            .map_err(join_failed)?
    }
}

/// Handler taking `A` whose result is discarded
pub struct VoidHandler<S: ?Sized, A> {
    raw: RawHandler<S>,
    _signature: PhantomData<fn(A)>,
}

impl<S: ?Sized, A> Clone for VoidHandler<S, A> {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw.clone(),
            _signature: PhantomData,
        }
    }
}

impl<S: ?Sized, A> fmt::Debug for VoidHandler<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoidHandler")
            .field("name", &self.raw.name)
            .field("arguments", &std::any::type_name::<A>())
            .finish()
    }
}

impl<S, A> VoidHandler<S, A>
where
    S: ScriptResource + ?Sized,
    A: HandlerArgs,
{
    pub fn name(&self) -> &str {
        self.raw.name()
    }

    pub fn arity(&self) -> usize {
        A::ARITY
    }

    pub fn call(&self, args: A) -> Result<()> {
        let arguments = args.pack().map_err(conversion_failed)?;
        self.raw.call(arguments)?;
        Ok(())
    }

    /// Turn into a plain closure
    pub fn into_fn(self) -> impl Fn(A) -> Result<()> {
        move |args| self.call(args)
    }
}

impl<S, A> VoidHandler<S, A>
where
    S: ScriptResource + Send + Sync + ?Sized + 'static,
    A: HandlerArgs + Send + 'static,
{
    /// Run the call on the blocking thread pool
    pub async fn call_blocking(&self, args: A) -> Result<()> {
        let handler = self.clone();
        tokio::task::spawn_blocking(move || handler.call(args))
            .await
            .map_err(join_failed)?
    }
}

/// Handler constructors on a shared script
pub trait HandlerExt<S: ScriptResource + ?Sized> {
    /// Descriptor-level handler
    fn raw_handler(&self, name: &str) -> RawHandler<S>;

    /// Typed handler, e.g. `script.handler::<(i32, i32), i32>("add")`
    fn handler<A, R>(&self, name: &str) -> Handler<S, A, R>
    where
        A: HandlerArgs,
        R: DescriptorConvertible;

    /// Typed handler without a return value
    fn void_handler<A: HandlerArgs>(&self, name: &str) -> VoidHandler<S, A>;

    /// One-shot descriptor-level call
    fn raw_call(
        &self,
        name: &str,
        arguments: Option<Descriptor>,
    ) -> std::result::Result<Descriptor, InvocationError>;
}

impl<S: ScriptResource + ?Sized> HandlerExt<S> for Arc<S> {
    fn raw_handler(&self, name: &str) -> RawHandler<S> {
        RawHandler::new(Arc::clone(self), name)
    }

    fn handler<A, R>(&self, name: &str) -> Handler<S, A, R>
    where
        A: HandlerArgs,
        R: DescriptorConvertible,
    {
        self.raw_handler(name).typed()
    }

    fn void_handler<A: HandlerArgs>(&self, name: &str) -> VoidHandler<S, A> {
        self.raw_handler(name).void()
    }

    fn raw_call(
        &self,
        name: &str,
        arguments: Option<Descriptor>,
    ) -> std::result::Result<Descriptor, InvocationError> {
        self.raw_handler(name).call(arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{ErrorInfo, RawOutcome};
    use crate::event::{AppleEvent, DIRECT_OBJECT};
    use parking_lot::Mutex;

    /// Records every event and answers with a fixed outcome
    struct Recorder {
        events: Mutex<Vec<AppleEvent>>,
        outcome: RawOutcome,
    }

    impl Recorder {
        fn answering(outcome: RawOutcome) -> Arc<Self> {
            Arc::new(Self {
                events: Mutex::new(Vec::new()),
                outcome,
            })
        }

        fn last_event(&self) -> AppleEvent {
            self.events.lock().last().cloned().unwrap()
        }
    }

    impl ScriptResource for Recorder {
        fn execute_event(&self, event: &AppleEvent) -> RawOutcome {
            self.events.lock().push(event.clone());
            self.outcome.clone()
        }
    }

    #[test]
    fn test_arity() {
        assert_eq!(<() as HandlerArgs>::ARITY, 0);
        assert_eq!(<(i32,) as HandlerArgs>::ARITY, 1);
        assert_eq!(<(i32, String, bool) as HandlerArgs>::ARITY, 3);
    }

    #[test]
    fn test_pack_order() {
        let packed = (1i32, "two".to_string(), 3.0f64).pack().unwrap().unwrap();
        assert_eq!(
            packed,
            Descriptor::from(vec![
                Descriptor::Int32(1),
                Descriptor::text("two"),
                Descriptor::Double(3.0),
            ])
        );
        assert_eq!(().pack().unwrap(), None);
    }

    #[test]
    fn test_single_vec_argument_is_nested() {
        let packed = (vec![1i32, 2],).pack().unwrap().unwrap();
        assert_eq!(packed.number_of_items(), 1);
        assert_eq!(packed.at_index(1).unwrap().number_of_items(), 2);
    }

    #[test]
    fn test_typed_call_packs_direct_object() {
        let script = Recorder::answering(RawOutcome::success(Descriptor::Int32(5)));
        let add = script.handler::<(i32, i32), i32>("Add");

        assert_eq!(add.call((2, 3)), Ok(5));

        let event = script.last_event();
        assert_eq!(event.subroutine_name().as_deref(), Some("add"));
        assert_eq!(
            event.param(DIRECT_OBJECT),
            Some(&Descriptor::from(vec![Descriptor::Int32(2), Descriptor::Int32(3)]))
        );
    }

    #[test]
    fn test_zero_arguments_no_direct_object() {
        let script = Recorder::answering(RawOutcome::success(Descriptor::null()));
        script.void_handler::<()>("doThing").call(()).unwrap();
        assert!(script.last_event().direct_object().is_none());
    }

    #[test]
    fn test_void_discards_result() {
        let script = Recorder::answering(RawOutcome::success(Descriptor::text("ignored")));
        assert_eq!(script.void_handler::<(bool,)>("flag").call((true,)), Ok(()));
    }

    #[test]
    fn test_return_conversion_error() {
        let script = Recorder::answering(RawOutcome::success(Descriptor::text("nope")));
        let err = script.handler::<(), i32>("count").call(()).unwrap_err();
        assert!(matches!(err, Error::Conversion(ConversionError::CouldNotCoerce { .. })));
    }

    #[test]
    fn test_invocation_error_propagates() {
        let script = Recorder::answering(RawOutcome::failure(ErrorInfo::new(-1743, "denied")));
        let err = script.void_handler::<()>("control").call(()).unwrap_err();
        assert_eq!(err, Error::Invocation(InvocationError::new(-1743, "denied")));
    }

    #[test]
    fn test_handler_keeps_script_alive() {
        let script = Recorder::answering(RawOutcome::success(Descriptor::null()));
        let handler = script.void_handler::<()>("doThing");
        let weak = Arc::downgrade(&script);
        drop(script);

        assert!(weak.upgrade().is_some());
        handler.call(()).unwrap();
        drop(handler);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_into_fn() {
        let script = Recorder::answering(RawOutcome::success(Descriptor::Boolean(true)));
        let is_ready = script.handler::<(String,), bool>("isReady").into_fn();
        assert_eq!(is_ready(("db".to_string(),)), Ok(true));
    }

    #[test]
    fn test_raw_call() {
        let script = Recorder::answering(RawOutcome::success(Descriptor::Int32(1)));
        let args = Descriptor::from(vec![Descriptor::text("x")]);
        assert_eq!(script.raw_call("Echo", Some(args.clone())), Ok(Descriptor::Int32(1)));
        assert_eq!(script.last_event().direct_object(), Some(&args));
    }

    #[test]
    fn test_with_builder() {
        let script = Recorder::answering(RawOutcome::success(Descriptor::null()));
        let builder = EventBuilder::new().with_name_case(crate::config::NameCase::Preserve);
        script
            .raw_handler("doThing")
            .with_builder(builder)
            .void::<()>()
            .call(())
            .unwrap();
        assert_eq!(script.last_event().subroutine_name().as_deref(), Some("doThing"));
    }

    #[tokio::test]
    async fn test_call_blocking() {
        let script = Recorder::answering(RawOutcome::success(Descriptor::Int32(9)));
        let square = script.handler::<(i32,), i32>("square");
        assert_eq!(square.call_blocking((3,)).await, Ok(9));

        let reset = script.void_handler::<()>("reset");
        assert_eq!(reset.call_blocking(()).await, Ok(()));
    }
}
