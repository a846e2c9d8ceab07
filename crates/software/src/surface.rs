//! Provides [`ControlSurface`], the object which owns the registries and drives every cycle.

use crate::{
    config::SurfaceConfig,
    element::{BankSelector, ControlElement, InputElement},
    input::{InputStage, InputStrategy, Inputs, Operation, SystemExclusiveHandler},
    registry::{Registry, RegistryError, DEFAULT_CAPACITY},
    transport::{Transport, UsbMidiTransport},
};

enum Binding<'a, T> {
    Unbound,
    Shared(&'a mut (dyn Transport + 'a)),
    Owned(T),
}

impl<T: Transport> Binding<'_, T> {
    fn get(&mut self) -> Option<&mut dyn Transport> {
        match self {
            Self::Unbound => None,
            Self::Shared(transport) => Some(&mut **transport),
            Self::Owned(transport) => Some(transport),
        }
    }
}

/// The dispatch and refresh engine of a control surface.
///
/// An application constructs exactly one `ControlSurface`, registers its elements with it during setup, and then calls
/// [`run_cycle()`](Self::run_cycle) from its main loop for as long as it runs. Each cycle, in order:
///
/// 1. every [`ControlElement`] is refreshed, in registration order;
/// 2. every [`BankSelector`] is refreshed, in registration order;
/// 3. the input stage runs. By default it reads at most one event from the transport and routes it to the first
///    [`InputElement`] that claims it, then refreshes every input element. See [`InputHandling`](crate::InputHandling).
///
/// Reading a single event per cycle keeps the time between output refreshes bounded; anything else waits in the
/// transport's queue for a later cycle.
///
/// The transport is bound lazily, on the first call to [`initialize()`](Self::initialize) or
/// [`run_cycle()`](Self::run_cycle). If the application provided one with
/// [`set_default_transport()`](Self::set_default_transport) it is used; otherwise the surface constructs and owns a
/// `T`, a [`UsbMidiTransport`] unless specified otherwise.
pub struct ControlSurface<'a, T: Transport + Default = UsbMidiTransport, const N: usize = DEFAULT_CAPACITY> {
    default_transport: Option<&'a mut (dyn Transport + 'a)>,
    transport: Binding<'a, T>,
    controls: Registry<'a, dyn ControlElement + 'a, N>,
    bank_selectors: Registry<'a, dyn BankSelector + 'a, N>,
    inputs: Inputs<'a, N>,
    strategy: InputStrategy,
}

impl<'a, T: Transport + Default, const N: usize> Default for ControlSurface<'a, T, N> {
    fn default() -> Self {
        Self::new(SurfaceConfig::default())
    }
}

impl<'a, T: Transport + Default, const N: usize> ControlSurface<'a, T, N> {
    /// Construct a [`ControlSurface`] with no transport bound and no elements registered.
    pub fn new(config: SurfaceConfig) -> Self {
        Self {
            default_transport: None,
            transport: Binding::Unbound,
            controls: Registry::new(),
            bank_selectors: Registry::new(),
            inputs: Inputs::default(),
            strategy: config.input.into(),
        }
    }

    /// Provide the transport to bind at initialization, in place of an owned fallback.
    ///
    /// Has no effect once a transport has been bound.
    pub fn set_default_transport(&mut self, transport: &'a mut (dyn Transport + 'a)) {
        if matches!(self.transport, Binding::Unbound) {
            self.default_transport = Some(transport);
        } else {
            warn!("Transport already bound, ignoring default transport");
        }
    }

    /// Bind a transport and start it. Subsequent calls do nothing.
    pub fn initialize(&mut self) {
        if !matches!(self.transport, Binding::Unbound) {
            return;
        }
        self.transport = match self.default_transport.take() {
            Some(transport) => {
                info!("Binding default transport");
                Binding::Shared(transport)
            }
            None => {
                info!("No default transport provided, constructing fallback");
                Binding::Owned(T::default())
            }
        };
        if let Some(transport) = self.transport.get() {
            transport.begin();
        }
    }

    /// Run one cycle and report what the input stage did. Initializes the surface first if necessary.
    pub fn run_cycle(&mut self) -> Operation {
        self.initialize();
        let Some(transport) = self.transport.get() else {
            return Operation::none();
        };

        for control in self.controls.iter_mut() {
            control.refresh(transport);
        }
        for selector in self.bank_selectors.iter_mut() {
            selector.refresh();
        }
        self.strategy.process(transport, &mut self.inputs)
    }

    /// The bound transport, for code which needs to emit MIDI outside of a [`ControlElement::refresh()`].
    ///
    /// Returns `None` before the surface is initialized.
    pub fn transport(&mut self) -> Option<&mut dyn Transport> {
        self.transport.get()
    }

    /// The fallback transport, if the surface constructed one. Use this to feed it input or collect its output.
    pub fn owned_transport(&mut self) -> Option<&mut T> {
        match &mut self.transport {
            Binding::Owned(transport) => Some(transport),
            _ => None,
        }
    }

    /// Returns `true` if the bound transport is a fallback the surface constructed itself.
    pub fn owns_transport(&self) -> bool {
        matches!(self.transport, Binding::Owned(_))
    }

    /// Add an element to the control registry.
    pub fn register_control(&mut self, element: &'a mut (dyn ControlElement + 'a)) -> Result<(), RegistryError> {
        self.controls.register(element)
    }

    /// Add an element to the bank selector registry.
    pub fn register_bank_selector(&mut self, element: &'a mut (dyn BankSelector + 'a)) -> Result<(), RegistryError> {
        self.bank_selectors.register(element)
    }

    /// Add an element to the input registry for its [`category()`](InputElement::category).
    pub fn register_input(&mut self, element: &'a mut (dyn InputElement + 'a)) -> Result<(), RegistryError> {
        self.inputs.register(element)
    }

    /// Install the observer System Exclusive messages are handed to.
    pub fn set_system_exclusive_handler(&mut self, handler: &'a mut (dyn SystemExclusiveHandler + 'a)) {
        self.inputs.set_system_exclusive_handler(handler);
    }
}
