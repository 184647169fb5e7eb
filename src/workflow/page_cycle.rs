//! 表单页循环计数
//!
//! 每一页上的进展与错误计数，成功翻页后重置

/// 一次字段统计相对上一轮的变化
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// 本页第一次统计
    First,
    /// 未填字段数发生变化
    Changed { from: usize, to: usize },
    /// 与上一轮相同，附带连续无进展次数
    Stalled(usize),
}

/// 表单页循环状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCycleState {
    /// 当前表单页（从1开始）
    pub current_page_index: usize,
    pub previous_unfilled_field_count: Option<usize>,
    pub consecutive_no_progress_count: usize,
    pub consecutive_failure_count: usize,
    /// 当前页已经跑过的轮数
    pub cycles_on_page: usize,
}

impl Default for PageCycleState {
    fn default() -> Self {
        Self::new()
    }
}

impl PageCycleState {
    pub fn new() -> Self {
        Self {
            current_page_index: 1,
            previous_unfilled_field_count: None,
            consecutive_no_progress_count: 0,
            consecutive_failure_count: 0,
            cycles_on_page: 0,
        }
    }

    pub fn begin_cycle(&mut self) {
        self.cycles_on_page += 1;
    }

    /// 记录一次校验错误，返回连续错误次数
    pub fn record_failure(&mut self) -> usize {
        self.consecutive_failure_count += 1;
        self.consecutive_failure_count
    }

    pub fn clear_failures(&mut self) {
        self.consecutive_failure_count = 0;
    }

    /// 连续错误是否超过上限
    pub fn failures_exceeded(&self, ceiling: usize) -> bool {
        self.consecutive_failure_count > ceiling
    }

    /// 记录本轮未填字段数
    pub fn record_unfilled_count(&mut self, count: usize) -> Progress {
        let progress = match self.previous_unfilled_field_count {
            None => {
                self.consecutive_no_progress_count = 0;
                Progress::First
            }
            Some(previous) if previous == count => {
                self.consecutive_no_progress_count += 1;
                Progress::Stalled(self.consecutive_no_progress_count)
            }
            Some(previous) => {
                self.consecutive_no_progress_count = 0;
                Progress::Changed {
                    from: previous,
                    to: count,
                }
            }
        };
        self.previous_unfilled_field_count = Some(count);
        progress
    }

    /// 连续无进展次数达到上限即为卡住
    pub fn is_stuck(&self, ceiling: usize) -> bool {
        self.consecutive_no_progress_count >= ceiling
    }

    /// 成功翻到下一页
    pub fn advance_page(&mut self) {
        *self = Self {
            current_page_index: self.current_page_index + 1,
            ..Self::new()
        };
    }
}
