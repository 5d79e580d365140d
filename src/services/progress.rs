//! 进度模拟器 - 纯展示用
//!
//! 按时钟推进的多阶段进度条，只看墙钟时间，不感知真实求解是否完成。

use std::time::{Duration, Instant};
use tracing::debug;

/// 一个阶段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub key: &'static str,
    pub label: &'static str,
    pub duration: Duration,
}

impl Stage {
    pub const fn new(key: &'static str, label: &'static str, secs: u64) -> Self {
        Self {
            key,
            label,
            duration: Duration::from_secs(secs),
        }
    }
}

/// 默认的量子流水线阶段
pub fn default_pipeline() -> Vec<Stage> {
    vec![
        Stage::new("parse", "Parsing the file", 2),
        Stage::new("qubo", "Generating QUBO", 3),
        Stage::new("solve", "Solving", 6),
        Stage::new("fix", "Correcting the output", 1),
        Stage::new("done", "Finished", 1),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    /// 尚未开始或已重置
    Idle,
    /// 正在第 n 个阶段
    Running(usize),
    /// 所有阶段走完
    Finished,
}

/// 进度快照，供进度条显示
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub phase: ProgressPhase,
    /// 当前阶段内已用时间（不超过该阶段时长）
    pub stage_elapsed: Duration,
    /// 累计进度
    pub elapsed: Duration,
    pub total: Duration,
}

impl ProgressSnapshot {
    /// 0.0 ~ 1.0
    pub fn fraction(&self) -> f64 {
        if self.total.is_zero() {
            return 0.0;
        }
        (self.elapsed.as_secs_f64() / self.total.as_secs_f64()).clamp(0.0, 1.0)
    }
}

pub struct ProgressSimulator {
    stages: Vec<Stage>,
    phase: ProgressPhase,
    stage_started_at: Option<Instant>,
    stage_elapsed: Duration,
    elapsed: Duration,
}

impl ProgressSimulator {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self {
            stages,
            phase: ProgressPhase::Idle,
            stage_started_at: None,
            stage_elapsed: Duration::ZERO,
            elapsed: Duration::ZERO,
        }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn total_duration(&self) -> Duration {
        self.stages.iter().map(|s| s.duration).sum()
    }

    pub fn phase(&self) -> ProgressPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, ProgressPhase::Running(_))
    }

    /// 当前阶段
    pub fn current_stage(&self) -> Option<&Stage> {
        match self.phase {
            ProgressPhase::Running(i) => self.stages.get(i),
            _ => None,
        }
    }

    /// 从第 0 阶段开始计时
    pub fn start(&mut self, now: Instant) {
        self.stage_elapsed = Duration::ZERO;
        self.elapsed = Duration::ZERO;
        if self.stages.is_empty() {
            self.phase = ProgressPhase::Finished;
            self.stage_started_at = None;
            return;
        }
        self.phase = ProgressPhase::Running(0);
        self.stage_started_at = Some(now);
        debug!("进度模拟开始: {}", self.stages[0].label);
    }

    /// 停止计时并回到未开始状态
    pub fn reset(&mut self) {
        self.phase = ProgressPhase::Idle;
        self.stage_started_at = None;
        self.stage_elapsed = Duration::ZERO;
        self.elapsed = Duration::ZERO;
    }

    /// 一帧
    ///
    /// 当前阶段用时达到时长后进入下一阶段，下一阶段从 `now` 开始计时；
    /// 最后一个阶段结束后进入 `Finished`。
    pub fn tick(&mut self, now: Instant) -> ProgressSnapshot {
        let (ProgressPhase::Running(index), Some(started)) = (self.phase, self.stage_started_at) else {
            return self.snapshot();
        };

        let stage_duration = self.stages[index].duration;
        let t = now.saturating_duration_since(started);
        let clamped = t.min(stage_duration);
        let previous: Duration = self.stages[..index].iter().map(|s| s.duration).sum();

        self.stage_elapsed = clamped;
        self.elapsed = previous + clamped;

        if t >= stage_duration {
            if index + 1 == self.stages.len() {
                self.phase = ProgressPhase::Finished;
                self.stage_started_at = None;
                self.stage_elapsed = Duration::ZERO;
                self.elapsed = self.total_duration();
                debug!("进度模拟结束");
            } else {
                self.phase = ProgressPhase::Running(index + 1);
                self.stage_started_at = Some(now);
                self.stage_elapsed = Duration::ZERO;
                debug!("进入阶段: {}", self.stages[index + 1].label);
            }
        }

        self.snapshot()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            phase: self.phase,
            stage_elapsed: self.stage_elapsed,
            elapsed: self.elapsed,
            total: self.total_duration(),
        }
    }
}

impl Default for ProgressSimulator {
    fn default() -> Self {
        Self::new(default_pipeline())
    }
}

/// 以固定帧间隔驱动模拟器直到结束，每帧回调一次
pub async fn drive<F>(sim: &mut ProgressSimulator, frame_interval: Duration, mut on_frame: F) -> ProgressSnapshot
where
    F: FnMut(&ProgressSimulator, ProgressSnapshot),
{
    let mut interval = tokio::time::interval(frame_interval.max(Duration::from_millis(1)));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    if sim.phase() == ProgressPhase::Idle {
        sim.start(tokio::time::Instant::now().into_std());
    }

    loop {
        let now = interval.tick().await.into_std();
        let snapshot = sim.tick(now);
        on_frame(sim, snapshot);
        if !sim.is_running() {
            return snapshot;
        }
    }
}
