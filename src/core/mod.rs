pub mod driver;
pub mod event;
pub mod observer;
pub mod state;

pub use driver::SchedCore;
pub use event::{MemorySnapshot, Transition, TransitionLog};
pub use state::{
    Discipline, Pid, ProcState, Process, QueueKind, ReadyQueue, SimCtx, Slot, SlotId, TaskId,
    Ticks,
};
