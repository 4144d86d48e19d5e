#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

#[derive(Debug, Default)]
pub struct TaskSeq {
    next: u64,
}

impl TaskSeq {
    pub fn next_id(&mut self) -> TaskId {
        let id = TaskId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    FeedLoad,
    MyPostsLoad,
    ProfileLoad,
    CategoriesLoad,
}

#[derive(Debug, Clone)]
pub struct TaskStarted {
    pub id: TaskId,
}

#[derive(Debug)]
pub struct TaskCompleted<E> {
    pub id: TaskId,
    pub result: E,
}

/// Task lifecycle state (stored in AppState, mutated only by reducer).
#[derive(Debug, Default, Clone)]
pub struct TaskState {
    pub active: Option<TaskId>,
}

impl TaskState {
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn on_started(&mut self, started: &TaskStarted) {
        self.active = Some(started.id);
    }

    /// Finishes the task only if it is still the active one. A completion
    /// from a superseded load returns false and must be dropped.
    pub fn finish_if_active(&mut self, id: TaskId) -> bool {
        let ok = self.active == Some(id);
        if ok {
            self.active = None;
        }
        ok
    }

    pub fn clear(&mut self) {
        self.active = None;
    }
}

#[derive(Debug, Default, Clone)]
pub struct Tasks {
    pub feed_load: TaskState,
    pub my_posts_load: TaskState,
    pub profile_load: TaskState,
    pub categories_load: TaskState,
}

impl Tasks {
    pub fn state_mut(&mut self, kind: TaskKind) -> &mut TaskState {
        match kind {
            TaskKind::FeedLoad => &mut self.feed_load,
            TaskKind::MyPostsLoad => &mut self.my_posts_load,
            TaskKind::ProfileLoad => &mut self.profile_load,
            TaskKind::CategoriesLoad => &mut self.categories_load,
        }
    }

    pub fn is_any_running(&self) -> bool {
        self.feed_load.is_running()
            || self.my_posts_load.is_running()
            || self.profile_load.is_running()
            || self.categories_load.is_running()
    }
}
