use std::collections::VecDeque;

use floorplan_core::document::{EntityId, FloorPlan, FurnitureItem};
use floorplan_core::geometry::Point2;
use tracing::debug;

pub const DEFAULT_MAX_HISTORY: usize = 50;

/// 可撤销的家具操作。命令只保存自身捕获的数据，目标文档在执行时显式传入，
/// 因此重复执行或撤销的结果只取决于命令内容。
#[derive(Debug, Clone, PartialEq)]
pub enum FurnitureCommand {
    Add {
        item: FurnitureItem,
    },
    Remove {
        item: FurnitureItem,
        index: usize,
    },
    Move {
        id: EntityId,
        from: Point2,
        to: Point2,
    },
}

impl FurnitureCommand {
    pub fn add(item: FurnitureItem) -> Self {
        Self::Add { item }
    }

    /// 捕获当前文档中的家具及其位置，家具不存在时返回 `None`。
    pub fn remove(plan: &FloorPlan, id: EntityId) -> Option<Self> {
        let index = plan.furniture_index(id)?;
        let item = plan.furniture_items()[index].clone();
        Some(Self::Remove { item, index })
    }

    pub fn move_to(plan: &FloorPlan, id: EntityId, to: Point2) -> Option<Self> {
        let from = plan.furniture(id)?.position;
        Some(Self::Move { id, from, to })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add_furniture",
            Self::Remove { .. } => "remove_furniture",
            Self::Move { .. } => "move_furniture",
        }
    }

    pub fn target(&self) -> EntityId {
        match self {
            Self::Add { item } | Self::Remove { item, .. } => item.id,
            Self::Move { id, .. } => *id,
        }
    }

    pub fn execute(&self, plan: &mut FloorPlan) {
        match self {
            Self::Add { item } => {
                plan.insert_furniture(item.clone());
            }
            Self::Remove { item, .. } => {
                plan.remove_furniture(item.id);
            }
            Self::Move { id, to, .. } => {
                plan.set_furniture_position(*id, *to);
            }
        }
    }

    pub fn undo(&self, plan: &mut FloorPlan) {
        match self {
            Self::Add { item } => {
                plan.remove_furniture(item.id);
            }
            Self::Remove { item, index } => {
                plan.insert_furniture_at(*index, item.clone());
            }
            Self::Move { id, from, .. } => {
                plan.set_furniture_position(*id, *from);
            }
        }
    }
}

/// 撤销/重做栈。撤销栈超出上限时从最旧的一端淘汰。
#[derive(Debug, Clone)]
pub struct History {
    done: VecDeque<FurnitureCommand>,
    undone: Vec<FurnitureCommand>,
    max_len: usize,
}

impl History {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_MAX_HISTORY)
    }

    /// 上限至少为 1。
    pub fn with_limit(max_len: usize) -> Self {
        let max_len = max_len.max(1);
        Self {
            done: VecDeque::with_capacity(max_len),
            undone: Vec::new(),
            max_len,
        }
    }

    /// 执行命令并压入撤销栈，同时清空重做栈。
    pub fn execute(&mut self, command: FurnitureCommand, plan: &mut FloorPlan) {
        command.execute(plan);
        debug!(
            command = command.name(),
            target = command.target().get(),
            "执行家具命令"
        );
        self.done.push_back(command);
        self.undone.clear();
        self.trim();
    }

    /// 撤销最近一次命令；撤销栈为空时返回 `false`。
    pub fn undo(&mut self, plan: &mut FloorPlan) -> bool {
        let Some(command) = self.done.pop_back() else {
            return false;
        };
        command.undo(plan);
        debug!(command = command.name(), target = command.target().get(), "撤销");
        self.undone.push(command);
        true
    }

    pub fn redo(&mut self, plan: &mut FloorPlan) -> bool {
        let Some(command) = self.undone.pop() else {
            return false;
        };
        command.execute(plan);
        debug!(command = command.name(), target = command.target().get(), "重做");
        self.done.push_back(command);
        true
    }

    pub fn clear(&mut self) {
        self.done.clear();
        self.undone.clear();
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        !self.done.is_empty()
    }

    #[inline]
    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    #[inline]
    pub fn undo_len(&self) -> usize {
        self.done.len()
    }

    #[inline]
    pub fn redo_len(&self) -> usize {
        self.undone.len()
    }

    #[inline]
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn set_max_len(&mut self, max_len: usize) {
        self.max_len = max_len.max(1);
        self.trim();
    }

    /// 撤销栈中的命令，从最旧到最新。
    pub fn done(&self) -> impl Iterator<Item = &FurnitureCommand> {
        self.done.iter()
    }

    pub fn last_done(&self) -> Option<&FurnitureCommand> {
        self.done.back()
    }

    fn trim(&mut self) {
        while self.done.len() > self.max_len {
            if let Some(evicted) = self.done.pop_front() {
                debug!(command = evicted.name(), "撤销历史超出上限，淘汰最旧记录");
            }
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use floorplan_core::geometry::Size2;

    use super::*;

    fn chair(plan: &mut FloorPlan, x: f64) -> FurnitureItem {
        let id = plan.allocate_id();
        FurnitureItem::new(id, "chair", "Chair", Point2::new(x, 0.0), Size2::new(50.0, 50.0))
    }

    fn ids(plan: &FloorPlan) -> Vec<EntityId> {
        plan.furniture_items().iter().map(|item| item.id).collect()
    }

    #[test]
    fn add_add_undo_undo_redo_leaves_first_item() {
        let mut plan = FloorPlan::new("history");
        let mut history = History::new();
        let a = chair(&mut plan, 0.0);
        let b = chair(&mut plan, 100.0);

        history.execute(FurnitureCommand::add(a.clone()), &mut plan);
        history.execute(FurnitureCommand::add(b), &mut plan);
        assert!(history.undo(&mut plan));
        assert!(history.undo(&mut plan));
        assert!(plan.furniture_items().is_empty());
        assert!(history.redo(&mut plan));

        assert_eq!(ids(&plan), vec![a.id]);
        assert_eq!(history.undo_len(), 1);
        assert_eq!(history.redo_len(), 1);
    }

    #[test]
    fn undo_restores_pre_execute_state_exactly() {
        let mut plan = FloorPlan::new("history");
        let mut history = History::new();
        let items: Vec<_> = (0..3).map(|i| chair(&mut plan, i as f64 * 100.0)).collect();
        for item in &items {
            history.execute(FurnitureCommand::add(item.clone()), &mut plan);
        }

        let before = plan.clone();
        let remove = FurnitureCommand::remove(&plan, items[1].id).unwrap();
        history.execute(remove, &mut plan);
        assert_eq!(ids(&plan), vec![items[0].id, items[2].id]);
        history.undo(&mut plan);
        assert_eq!(plan, before);

        let moved = FurnitureCommand::move_to(&plan, items[2].id, Point2::new(5.0, 5.0)).unwrap();
        history.execute(moved, &mut plan);
        let after_move = plan.clone();
        history.undo(&mut plan);
        assert_eq!(plan, before);
        history.redo(&mut plan);
        assert_eq!(plan, after_move);
    }

    #[test]
    fn execute_after_undo_clears_redo() {
        let mut plan = FloorPlan::new("history");
        let mut history = History::new();
        let a = chair(&mut plan, 0.0);
        let b = chair(&mut plan, 100.0);
        history.execute(FurnitureCommand::add(a), &mut plan);
        history.undo(&mut plan);
        assert!(history.can_redo());

        history.execute(FurnitureCommand::add(b.clone()), &mut plan);
        assert!(!history.can_redo());
        assert!(!history.redo(&mut plan));
        assert_eq!(ids(&plan), vec![b.id]);
    }

    #[test]
    fn empty_stacks_are_no_ops() {
        let mut plan = FloorPlan::new("history");
        let mut history = History::new();
        let snapshot = plan.clone();
        assert!(!history.undo(&mut plan));
        assert!(!history.redo(&mut plan));
        assert_eq!(plan, snapshot);
    }

    #[test]
    fn oldest_entry_is_evicted_when_limit_exceeded() {
        let mut plan = FloorPlan::new("history");
        let mut history = History::with_limit(3);
        let items: Vec<_> = (0..4).map(|i| chair(&mut plan, i as f64 * 100.0)).collect();
        for item in &items {
            history.execute(FurnitureCommand::add(item.clone()), &mut plan);
        }
        assert_eq!(history.undo_len(), 3);
        let targets: Vec<_> = history.done().map(FurnitureCommand::target).collect();
        assert_eq!(targets, vec![items[1].id, items[2].id, items[3].id]);

        while history.undo(&mut plan) {}
        // 被淘汰的第一条命令无法撤销
        assert_eq!(ids(&plan), vec![items[0].id]);
    }

    #[test]
    fn default_limit_is_fifty() {
        let mut plan = FloorPlan::new("history");
        let mut history = History::new();
        for i in 0..=DEFAULT_MAX_HISTORY {
            let item = chair(&mut plan, i as f64 * 60.0);
            history.execute(FurnitureCommand::add(item), &mut plan);
        }
        assert_eq!(history.undo_len(), DEFAULT_MAX_HISTORY);
        assert_eq!(plan.furniture_items().len(), DEFAULT_MAX_HISTORY + 1);
    }

    #[test]
    fn replaying_done_commands_reproduces_collection() {
        let mut plan = FloorPlan::new("history");
        let mut history = History::new();
        let a = chair(&mut plan, 0.0);
        let b = chair(&mut plan, 100.0);
        let c = chair(&mut plan, 200.0);
        history.execute(FurnitureCommand::add(a.clone()), &mut plan);
        history.execute(FurnitureCommand::add(b.clone()), &mut plan);
        let moved = FurnitureCommand::move_to(&plan, a.id, Point2::new(0.0, 300.0)).unwrap();
        history.execute(moved, &mut plan);
        history.undo(&mut plan);
        history.execute(FurnitureCommand::add(c), &mut plan);
        let removed = FurnitureCommand::remove(&plan, b.id).unwrap();
        history.execute(removed, &mut plan);

        let mut replay = FloorPlan::new("replay");
        for command in history.done() {
            command.execute(&mut replay);
        }
        assert_eq!(replay.furniture_items(), plan.furniture_items());
    }

    #[test]
    fn shrinking_limit_trims_oldest() {
        let mut plan = FloorPlan::new("history");
        let mut history = History::with_limit(10);
        for i in 0..5 {
            let item = chair(&mut plan, i as f64 * 60.0);
            history.execute(FurnitureCommand::add(item), &mut plan);
        }
        history.set_max_len(2);
        assert_eq!(history.undo_len(), 2);
        assert_eq!(history.max_len(), 2);
        history.clear();
        assert!(!history.can_undo());
    }
}
