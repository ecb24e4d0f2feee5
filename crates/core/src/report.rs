use std::fmt::{Display, Write};

use chrono::{DateTime, TimeZone};

use crate::models::{render_reading, BriefingInput};

pub const BRIEFING_TITLE: &str = "阳朔洪水预警简报";
pub const ISSUING_OFFICE: &str = "阳朔县水文局";

const DEFAULT_STATION_NAME: &str = "未知站点";
const DEFAULT_STATION_STATUS: &str = "正常";
const DEFAULT_STATION_ADDRESS: &str = "阳朔县";
const DEFAULT_ALERT_KIND: &str = "通用";
const DEFAULT_ALERT_LEVEL: &str = "未定级";

const STANDING_RISKS: &str = "1. **暴雨洪涝风险（高等级）**
未来三天，华南仍有持续性强降雨，累计雨量可达100～200毫米，局地超300毫米。山洪、中小河流洪水、城乡内涝和地质灾害风险极高，尤其粤北、闽西南山区需高度警惕。

2. **高温中暑风险（中等级）**
华北、黄淮等地高温天气持续，紫外线强，户外活动易引发中暑，老年人、儿童及慢性病患者应减少外出。

3. **次生灾害风险**
强降雨可能导致山体滑坡、泥石流，特别是在地形复杂、前期土壤饱和区域，请避免前往山区、河道、地质灾害隐患点。

4. **交通安全风险**
雨天道路湿滑，能见度降低，高速公路、城市主干道易发生拥堵或事故；地铁站、地下车库注意防范倒灌。

";

const RECOMMENDED_ACTIONS: &str = "---

### 三、建议行动

#### 公众应对措施：

- **居住在低洼地带、河边、山脚的居民**：密切关注水情预警，提前准备应急包（含食物、饮用水、药品、手电筒等），必要时听从政府安排及时转移。

- **出行人员**：尽量避免涉水行车，切勿强行通过积水路段；如遇车辆熄火，应立即弃车逃生。

- **户外工作者**：高温时段（11:00–15:00）暂停露天作业，做好防暑降温措施，及时补水补盐。

- **学生与家长**：雷雨期间避免户外活动，关注学校停课通知，确保上下学安全。

- **居家防范**：检查排水管道，清理阳台杂物，防止高空坠物；关闭门窗，防止雨水倒灌。

#### 特别提醒：

- 请通过官方渠道（如\"中国气象局\"、\"水利部水情信息网\"、地方应急广播）获取最新预警信息，不信谣、不传谣。

- 如遇紧急情况，请立即拨打当地应急电话（如110、119、12350）求助。

---

**后续展望**：
";

const DEFAULT_OUTLOOK: &str = "预计未来24小时内，高压系统将带来短暂晴朗天气，但新一轮冷空气将在今晚进入，伴有大风降温。请相关部门做好防御工作，公众提高警惕。

";

const CLOSING: &str = "
---

**生命至上，安全第一。科学防范，共度汛期。**
—— 阳朔县水文局 敬告
";

pub fn format_issued_at<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.format("%Y年%m月%d日 %H:%M").to_string()
}

/// Renders the public flood-warning briefing as markdown.
///
/// Sections: current observations, risk notes, recommended actions, outlook.
/// Empty inputs fall back to the standing risk list and outlook paragraph.
pub fn generate_briefing_markdown(input: &BriefingInput, issued_at: &str) -> String {
    let mut out = String::with_capacity(4096);

    let _ = write!(
        out,
        "**{BRIEFING_TITLE}**\n**发布日期：{issued_at}**\n**发布单位：{ISSUING_OFFICE}**\n\n---\n\n### 一、当前观测情况\n\n"
    );

    if !input.water_stations.is_empty() {
        out.push_str("#### 水文站点监测\n\n");
        for station in &input.water_stations {
            let _ = writeln!(
                out,
                "- **{}** ({}): 水位 {} m，状态 {}",
                non_empty_or(station.name.as_deref(), DEFAULT_STATION_NAME),
                non_empty_or(station.address.as_deref(), DEFAULT_STATION_ADDRESS),
                render_reading(&station.level),
                non_empty_or(station.status.as_deref(), DEFAULT_STATION_STATUS),
            );
        }
        out.push('\n');
    }

    if !input.rainfall.is_empty() {
        out.push_str("#### 降雨观测\n\n");
        for reading in &input.rainfall {
            let _ = writeln!(
                out,
                "- **{}**: 24小时累计降雨 {} mm",
                reading.station,
                render_reading(&reading.rainfall_24h)
            );
        }
        out.push('\n');
    }

    out.push_str("---\n\n### 二、风险提示\n\n");

    if input.alerts.is_empty() {
        out.push_str(STANDING_RISKS);
    } else {
        for (index, alert) in input.alerts.iter().enumerate() {
            let _ = write!(
                out,
                "{}. **{}风险（{}）**\n{}\n\n",
                index + 1,
                non_empty_or(alert.kind.as_deref(), DEFAULT_ALERT_KIND),
                non_empty_or(alert.level.as_deref(), DEFAULT_ALERT_LEVEL),
                alert.description,
            );
        }
    }

    out.push_str(RECOMMENDED_ACTIONS);

    match input
        .weather_info
        .as_deref()
        .map(str::trim)
        .filter(|info| !info.is_empty())
    {
        Some(info) => {
            out.push_str(info);
            out.push_str("\n\n");
        }
        None => out.push_str(DEFAULT_OUTLOOK),
    }

    out.push_str(CLOSING);
    out
}

fn non_empty_or<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => default,
    }
}
