use keyed_priority_queue::KeyedPriorityQueue;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

use super::event::{MemorySnapshot, Transition, TransitionLog};
use crate::sim::profile::ProcessProfile;

// Index into the process arena
pub type TaskId = usize;
pub type SlotId = usize;
pub type Pid = u32;
pub type Ticks = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcState {
    New,
    Ready,
    Running,
    Waiting,
    Terminated,
}

impl ProcState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Ready => "READY",
            Self::Running => "RUNNING",
            Self::Waiting => "WAITING",
            Self::Terminated => "TERMINATED",
        }
    }
}

impl fmt::Display for ProcState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which non-running collection a process currently belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueKind {
    New,
    Ready,
    Waiting,
    Terminated,
}

impl QueueKind {
    pub fn state(self) -> ProcState {
        match self {
            Self::New => ProcState::New,
            Self::Ready => ProcState::Ready,
            Self::Waiting => ProcState::Waiting,
            Self::Terminated => ProcState::Terminated,
        }
    }
}

#[derive(Debug)]
pub struct Process {
    pub id: TaskId,
    pub profile: ProcessProfile,
    pub state: ProcState,
    pub current_slot: Option<SlotId>,
    pub cpu_remaining: Ticks,
    // Ticks until the next I/O event while running, until I/O completion while waiting
    pub io_countdown: Ticks,
    pub wait_time: Option<Ticks>,
    pub turnaround_time: Option<Ticks>,
}

impl Process {
    pub fn pid(&self) -> Pid {
        self.profile.pid
    }

    /// Advance the running process by one tick of CPU.
    ///
    /// Returns `true` when the I/O countdown hit zero on this tick. A process
    /// with an I/O frequency of zero never blocks.
    pub fn consume_tick(&mut self) -> bool {
        self.cpu_remaining = self.cpu_remaining.saturating_sub(1);
        if self.io_countdown == 0 {
            return false;
        }
        self.io_countdown -= 1;
        self.io_countdown == 0
    }
}

#[derive(Debug)]
pub struct Slot {
    pub id: SlotId,
    pub current: Option<TaskId>,
}

/// Ordering key for the priority-ordered ready queue.
///
/// Higher priority wins; among equal priorities the earlier insertion wins.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub struct Rank {
    pub priority: i32,
    pub seq: u64,
}

// KeyedPriorityQueue is a max-heap, so lower sequence numbers must compare greater
impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discipline {
    Fifo,
    Priority,
}

#[derive(Debug)]
pub enum ReadyQueue {
    Fifo {
        tasks: VecDeque<TaskId>,
    },
    Priq {
        tasks: KeyedPriorityQueue<TaskId, Rank>,
    },
}

impl ReadyQueue {
    pub fn new(discipline: Discipline) -> Self {
        match discipline {
            Discipline::Fifo => Self::Fifo {
                tasks: VecDeque::new(),
            },
            Discipline::Priority => Self::Priq {
                tasks: KeyedPriorityQueue::new(),
            },
        }
    }

    pub fn contains(&self, task_id: TaskId) -> bool {
        match self {
            Self::Fifo { tasks } => tasks.contains(&task_id),
            Self::Priq { tasks } => tasks.iter().any(|t| *t.0 == task_id),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Fifo { tasks } => tasks.len(),
            Self::Priq { tasks } => tasks.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Simulation state for one run: the process arena, the queue set and the
/// running slots. Every transition goes through the methods below so that
/// queue membership, lifecycle state, the I/O countdown and the transition
/// log change together.
#[derive(Debug)]
pub struct SimCtx {
    pub now: Ticks,
    pub slots: Vec<Slot>,
    pub tasks: Vec<Process>,
    pub new: VecDeque<TaskId>,
    pub ready: ReadyQueue,
    pub waiting: VecDeque<TaskId>,
    pub terminated: Vec<TaskId>,
    pub task_to_queue: FxHashMap<TaskId, QueueKind>,
    pub log: TransitionLog,

    // Increment upon every push onto the ready queue
    next_seq: u64,
}

impl SimCtx {
    pub fn new(num_slots: usize, discipline: Discipline) -> Self {
        Self {
            now: 0,
            slots: (0..num_slots)
                .map(|id| Slot { id, current: None })
                .collect(),
            tasks: Vec::new(),
            new: VecDeque::new(),
            ready: ReadyQueue::new(discipline),
            waiting: VecDeque::new(),
            terminated: Vec::new(),
            task_to_queue: FxHashMap::default(),
            log: TransitionLog::default(),
            next_seq: 0,
        }
    }

    pub fn create_task(&mut self, profile: ProcessProfile) -> TaskId {
        let id = self.tasks.len();
        let task = Process {
            id,
            state: ProcState::New,
            current_slot: None,
            cpu_remaining: profile.total_cpu_time,
            io_countdown: profile.io_frequency,
            wait_time: None,
            turnaround_time: None,
            profile,
        };
        self.tasks.push(task);
        self.new.push_back(id);
        self.task_to_queue.insert(id, QueueKind::New);
        id
    }

    pub fn advance_time(&mut self, delta: Ticks) {
        self.now = self.now.saturating_add(delta);
    }

    pub fn task(&self, task_id: TaskId) -> &Process {
        &self.tasks[task_id]
    }

    pub fn task_mut(&mut self, task_id: TaskId) -> &mut Process {
        &mut self.tasks[task_id]
    }

    pub fn running(&self, slot: SlotId) -> Option<TaskId> {
        self.slots[slot].current
    }

    pub fn slot_is_idle(&self, slot: SlotId) -> bool {
        self.slots[slot].current.is_none()
    }

    pub fn all_slots_idle(&self) -> bool {
        self.slots.iter().all(|slot| slot.current.is_none())
    }

    /// True once nothing is left to arrive, run, or finish I/O.
    pub fn is_drained(&self) -> bool {
        self.new.is_empty() && self.ready.is_empty() && self.waiting.is_empty() && self.all_slots_idle()
    }

    pub fn queue_of(&self, task_id: TaskId) -> Option<QueueKind> {
        self.task_to_queue.get(&task_id).copied()
    }

    fn record(&mut self, task_id: TaskId, from: ProcState, to: ProcState, memory: Option<MemorySnapshot>) {
        let pid = self.task(task_id).pid();
        log::trace!("t={} pid={} {} -> {}", self.now, pid, from, to);
        self.log.push(Transition {
            tick: self.now,
            pid,
            from,
            to,
            memory,
        });
    }

    fn ready_push(&mut self, task_id: TaskId) {
        assert!(
            !self.task_to_queue.contains_key(&task_id),
            "Task {task_id} already present in some queue"
        );
        let seq = self.next_seq;
        self.next_seq += 1;
        let priority = self.task(task_id).profile.priority;
        match &mut self.ready {
            ReadyQueue::Fifo { tasks } => tasks.push_back(task_id),
            ReadyQueue::Priq { tasks } => {
                tasks.push(task_id, Rank { priority, seq });
            }
        }
        self.task_to_queue.insert(task_id, QueueKind::Ready);
    }

    fn leave_queue(&mut self, task_id: TaskId, expected: QueueKind) {
        let removed = self.task_to_queue.remove(&task_id);
        debug_assert_eq!(
            removed,
            Some(expected),
            "Task {task_id} was not a member of {expected:?}"
        );
    }

    /// Remove and return the next process to dispatch: the FIFO head, or the
    /// highest-ranked process for the priority discipline.
    pub fn ready_pop(&mut self) -> Option<TaskId> {
        let task = match &mut self.ready {
            ReadyQueue::Fifo { tasks } => tasks.pop_front(),
            ReadyQueue::Priq { tasks } => tasks.pop().map(|t| t.0),
        }?;
        self.leave_queue(task, QueueKind::Ready);
        Some(task)
    }

    /// Priority of the process `ready_pop` would return, without removing it.
    pub fn ready_peek_priority(&self) -> Option<i32> {
        match &self.ready {
            ReadyQueue::Fifo { tasks } => tasks
                .front()
                .map(|&task| self.task(task).profile.priority),
            ReadyQueue::Priq { tasks } => tasks.peek().map(|(_, rank)| rank.priority),
        }
    }

    /// Remove the first ready process, in insertion order, accepted by `fits`.
    /// Only meaningful for the FIFO discipline; a priority-ordered queue
    /// yields nothing.
    pub fn ready_take_first(&mut self, fits: impl Fn(&Process) -> bool) -> Option<TaskId> {
        let ReadyQueue::Fifo { tasks } = &mut self.ready else {
            debug_assert!(false, "first-fit scan requires a FIFO ready queue");
            return None;
        };
        let index = tasks.iter().position(|&task| fits(&self.tasks[task]))?;
        let task = tasks.remove(index)?;
        self.leave_queue(task, QueueKind::Ready);
        Some(task)
    }

    /// NEW -> READY for every process whose arrival tick is now, in input order.
    pub fn admit_arrivals(&mut self) {
        let now = self.now;
        let arriving: Vec<TaskId> = self
            .new
            .iter()
            .copied()
            .filter(|&task| self.task(task).profile.arrival_time == now)
            .collect();

        for task_id in arriving {
            self.new.retain(|&task| task != task_id);
            self.leave_queue(task_id, QueueKind::New);
            self.task_mut(task_id).state = ProcState::Ready;
            self.ready_push(task_id);
            self.record(task_id, ProcState::New, ProcState::Ready, None);
        }
    }

    /// Count down every waiting process; WAITING -> READY for those whose I/O
    /// finished, with the countdown re-armed to the I/O frequency.
    pub fn complete_io(&mut self) {
        let mut finished = Vec::new();
        for &task_id in &self.waiting {
            let task = &mut self.tasks[task_id];
            task.io_countdown = task.io_countdown.saturating_sub(1);
            if task.io_countdown == 0 {
                finished.push(task_id);
            }
        }

        for task_id in finished {
            self.waiting.retain(|&task| task != task_id);
            self.leave_queue(task_id, QueueKind::Waiting);
            let task = self.task_mut(task_id);
            task.state = ProcState::Ready;
            task.io_countdown = task.profile.io_frequency;
            self.ready_push(task_id);
            self.record(task_id, ProcState::Waiting, ProcState::Ready, None);
        }
    }

    /// READY -> RUNNING on `slot`. The caller has already taken `task_id` off
    /// the ready queue.
    pub fn dispatch(&mut self, slot: SlotId, task_id: TaskId, memory: Option<MemorySnapshot>) {
        debug_assert!(
            !self.task_to_queue.contains_key(&task_id),
            "Running task {task_id} must not be enqueued"
        );
        debug_assert!(
            self.slots[slot].current.is_none(),
            "Slot {slot} already running a task"
        );

        self.slots[slot].current = Some(task_id);
        let task = self.task_mut(task_id);
        debug_assert_eq!(task.state, ProcState::Ready);
        task.state = ProcState::Running;
        task.current_slot = Some(slot);
        self.record(task_id, ProcState::Ready, ProcState::Running, memory);
    }

    fn vacate(&mut self, slot: SlotId) -> TaskId {
        let task_id = self.slots[slot]
            .current
            .take()
            .unwrap_or_else(|| panic!("Slot {slot} has no running task"));
        let task = self.task_mut(task_id);
        debug_assert_eq!(task.state, ProcState::Running);
        task.current_slot = None;
        task_id
    }

    /// RUNNING -> TERMINATED; wait and turnaround are fixed at this tick.
    pub fn terminate(&mut self, slot: SlotId) -> TaskId {
        let task_id = self.vacate(slot);
        let now = self.now;
        let task = self.task_mut(task_id);
        let turnaround = now.saturating_sub(task.profile.arrival_time);
        task.state = ProcState::Terminated;
        task.turnaround_time = Some(turnaround);
        task.wait_time = Some(turnaround.saturating_sub(task.profile.total_cpu_time));
        self.terminated.push(task_id);
        self.task_to_queue.insert(task_id, QueueKind::Terminated);
        self.record(task_id, ProcState::Running, ProcState::Terminated, None);
        task_id
    }

    /// RUNNING -> WAITING for an I/O event; the countdown becomes the I/O duration.
    pub fn block(&mut self, slot: SlotId) -> TaskId {
        let task_id = self.vacate(slot);
        let task = self.task_mut(task_id);
        task.state = ProcState::Waiting;
        task.io_countdown = task.profile.io_duration;
        self.waiting.push_back(task_id);
        self.task_to_queue.insert(task_id, QueueKind::Waiting);
        self.record(task_id, ProcState::Running, ProcState::Waiting, None);
        task_id
    }

    /// RUNNING -> READY, re-enqueued at the tail of the ready queue.
    pub fn preempt(&mut self, slot: SlotId) -> TaskId {
        let task_id = self.vacate(slot);
        self.task_mut(task_id).state = ProcState::Ready;
        self.ready_push(task_id);
        self.record(task_id, ProcState::Running, ProcState::Ready, None);
        task_id
    }

    /// RUNNING -> WAITING without an I/O event: the process is parked on the
    /// waiting queue with its countdown untouched and rejoins READY when that
    /// countdown runs out.
    pub fn park(&mut self, slot: SlotId) -> TaskId {
        let task_id = self.vacate(slot);
        self.task_mut(task_id).state = ProcState::Waiting;
        self.waiting.push_back(task_id);
        self.task_to_queue.insert(task_id, QueueKind::Waiting);
        self.record(task_id, ProcState::Running, ProcState::Waiting, None);
        task_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(pid: Pid, arrival: Ticks, priority: i32) -> ProcessProfile {
        ProcessProfile {
            pid,
            arrival_time: arrival,
            total_cpu_time: 4,
            io_frequency: 2,
            io_duration: 3,
            priority,
            memory_required: 0,
        }
    }

    #[test]
    fn test_create_task_starts_new() {
        let mut ctx = SimCtx::new(1, Discipline::Fifo);
        let id = ctx.create_task(profile(7, 0, 0));
        let task = ctx.task(id);
        assert_eq!(task.state, ProcState::New);
        assert_eq!(task.cpu_remaining, 4);
        assert_eq!(task.io_countdown, 2);
        assert_eq!(ctx.queue_of(id), Some(QueueKind::New));
        assert!(!ctx.is_drained());
    }

    #[test]
    fn test_arrivals_only_at_matching_tick() {
        let mut ctx = SimCtx::new(1, Discipline::Fifo);
        let early = ctx.create_task(profile(1, 0, 0));
        let late = ctx.create_task(profile(2, 3, 0));
        ctx.admit_arrivals();
        assert_eq!(ctx.queue_of(early), Some(QueueKind::Ready));
        assert_eq!(ctx.queue_of(late), Some(QueueKind::New));
        assert_eq!(ctx.log.len(), 1);
    }

    #[test]
    fn test_priority_queue_breaks_ties_by_insertion() {
        let mut ctx = SimCtx::new(1, Discipline::Priority);
        let a = ctx.create_task(profile(1, 0, 3));
        let b = ctx.create_task(profile(2, 0, 3));
        let c = ctx.create_task(profile(3, 0, 1));
        ctx.admit_arrivals();
        assert_eq!(ctx.ready_peek_priority(), Some(3));
        assert_eq!(ctx.ready_pop(), Some(a));
        assert_eq!(ctx.ready_pop(), Some(b));
        assert_eq!(ctx.ready_pop(), Some(c));
        assert_eq!(ctx.ready_pop(), None);
    }

    #[test]
    fn test_block_resets_countdown_to_duration() {
        let mut ctx = SimCtx::new(1, Discipline::Fifo);
        let id = ctx.create_task(profile(1, 0, 0));
        ctx.admit_arrivals();
        let task = ctx.ready_pop().unwrap();
        ctx.dispatch(0, task, None);
        assert!(!ctx.task_mut(id).consume_tick());
        assert!(ctx.task_mut(id).consume_tick());
        ctx.block(0);
        assert_eq!(ctx.task(id).io_countdown, 3);
        assert_eq!(ctx.queue_of(id), Some(QueueKind::Waiting));

        ctx.complete_io();
        ctx.complete_io();
        assert_eq!(ctx.queue_of(id), Some(QueueKind::Waiting));
        ctx.complete_io();
        assert_eq!(ctx.queue_of(id), Some(QueueKind::Ready));
        assert_eq!(ctx.task(id).io_countdown, 2);
    }

    #[test]
    fn test_zero_frequency_never_blocks() {
        let mut ctx = SimCtx::new(1, Discipline::Fifo);
        let mut p = profile(1, 0, 0);
        p.io_frequency = 0;
        let id = ctx.create_task(p);
        for _ in 0..3 {
            assert!(!ctx.task_mut(id).consume_tick());
        }
        assert_eq!(ctx.task(id).cpu_remaining, 1);
    }

    #[test]
    fn test_ready_take_first_skips_misfits() {
        let mut ctx = SimCtx::new(1, Discipline::Fifo);
        let mut big = profile(1, 0, 0);
        big.memory_required = 500;
        let mut small = profile(2, 0, 0);
        small.memory_required = 50;
        ctx.create_task(big);
        let small_id = ctx.create_task(small);
        ctx.admit_arrivals();
        let taken = ctx.ready_take_first(|p| p.profile.memory_required <= 100);
        assert_eq!(taken, Some(small_id));
        assert_eq!(ctx.ready.len(), 1);
        assert_eq!(ctx.ready_take_first(|p| p.profile.memory_required <= 100), None);
    }
}
