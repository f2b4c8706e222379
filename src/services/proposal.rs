use crate::domain::zone::ZoneFinding;

/// Deterministic proposal rendering: fixed templates and lookup tables only,
/// no model call. Every lookup has a fallback, so any input renders.
pub fn build_proposal(
    url: &str,
    site_type: &str,
    traffic_estimate: &str,
    zones: &[ZoneFinding],
) -> String {
    let mut lines: Vec<String> = vec![
        format!(
            "Subject: Увеличьте доход от {} с Adlook - индивидуальное предложение",
            url
        ),
        String::new(),
        "Здравствуйте!".to_string(),
        String::new(),
    ];

    let site_type_ru = site_type_phrase(site_type);
    let traffic_desc = traffic_phrase(traffic_estimate);

    lines.push(format!(
        "Я изучил ваш проект {} и был впечатлен! Вижу, что у вас качественный {} с {}. Это отличная база для масштабирования монетизации.",
        url, site_type_ru, traffic_desc
    ));
    lines.push(String::new());

    let free_zones: Vec<&ZoneFinding> = zones.iter().filter(|z| z.is_free()).collect();
    let occupied_zones: Vec<&ZoneFinding> = zones.iter().filter(|z| z.is_occupied()).collect();

    if !occupied_zones.is_empty() {
        lines.push(
            "Я заметил, что у вас уже есть реклама на сайте. Это хорошо - значит, вы уже монетизируете трафик. Однако мы можем помочь увеличить доход на 30-50% за счёт оптимизации существующих мест и использования свободных зон.".to_string(),
        );
        lines.push(String::new());
    }

    lines.push(
        "Немного о нас: Adlook — это российская SSP-платформа (Supply-Side Platform), основанная в 2018 году в Санкт-Петербурге. Мы помогаем владельцам сайтов монетизировать свои ресурсы через прямую интеграцию с крупнейшими рекламодателями.".to_string(),
    );
    lines.push(String::new());
    lines.push("Результаты анализа вашего сайта:".to_string());
    lines.push(String::new());

    if !free_zones.is_empty() {
        lines.push("ДОСТУПНЫЕ ЗОНЫ ДЛЯ РАЗМЕЩЕНИЯ (свободны):".to_string());
        append_zone_list(&mut lines, &free_zones);
        lines.push(String::new());
    }

    if !occupied_zones.is_empty() {
        lines.push("ЗАНЯТЫЕ ЗОНЫ (требуют оптимизации):".to_string());
        append_zone_list(&mut lines, &occupied_zones);
        lines.push(String::new());
    }

    let (revenue_min, revenue_max) = revenue_estimate(traffic_estimate);

    lines.push("ВАШИ ВЫГОДЫ ОТ СОТРУДНИЧЕСТВА С ADLOOK:".to_string());
    lines.push(String::new());
    lines.push(format!(
        "1. УВЕЛИЧЕНИЕ ДОХОДА: от {} до {} рублей в месяц",
        format_thousands(revenue_min),
        format_thousands(revenue_max)
    ));

    if !occupied_zones.is_empty() {
        lines.push(
            "   Даже при наличии текущей рекламы, мы увеличим доход на 30-50% благодаря:"
                .to_string(),
        );
        lines.push("   - Прямым контрактам с премиум-рекламодателями".to_string());
        lines.push("   - Более высоким ставкам за показы и клики".to_string());
        lines.push("   - Оптимизации существующих размещений".to_string());
    } else {
        lines.push(
            "   Вы получите стабильный пассивный доход без изменения контента сайта".to_string(),
        );
    }

    lines.push(String::new());
    lines.push("2. БЫСТРЫЙ СТАРТ: интеграция за 1 день".to_string());
    lines.push("   - Мы сами установим рекламный код".to_string());
    lines.push("   - Настроим оптимальные форматы под ваш дизайн".to_string());
    lines.push("   - Первые выплаты уже через 2 недели".to_string());
    lines.push(String::new());
    lines.push("3. СОХРАНЕНИЕ ПОЛЬЗОВАТЕЛЬСКОГО ОПЫТА:".to_string());
    lines.push("   - Реклама не будет раздражать посетителей".to_string());
    lines.push("   - Адаптивные форматы под мобильные устройства".to_string());
    lines.push("   - Контроль над тематикой рекламы".to_string());
    lines.push(String::new());
    lines.push("4. ПРОЗРАЧНОСТЬ И КОНТРОЛЬ:".to_string());
    lines.push("   - Личный кабинет с детальной статистикой в реальном времени".to_string());
    lines.push("   - Еженедельные отчёты о доходах".to_string());
    lines.push("   - Выплаты два раза в месяц, без задержек".to_string());
    lines.push(String::new());

    if let Some(extra) = category_paragraph(site_type) {
        lines.extend(extra.iter().map(|line| line.to_string()));
        lines.push(String::new());
    }

    lines.push("ФОРМАТЫ РАЗМЕЩЕНИЯ:".to_string());
    lines.push("- Баннеры (статичные и анимированные)".to_string());
    lines.push("- Нативная реклама (встраивается в контент)".to_string());
    lines.push("- Видео-реклама (для сайтов с высоким трафиком)".to_string());
    lines.push("- Rich-media форматы (интерактивные объявления)".to_string());
    lines.push(String::new());
    lines.push(
        "Готов обсудить детали и ответить на ваши вопросы. Могу подготовить индивидуальный расчёт дохода с учётом специфики вашего проекта.".to_string(),
    );
    lines.push(String::new());
    lines.push("Давайте созвонимся на этой неделе? Предложите удобное время.".to_string());
    lines.push(String::new());
    lines.push("С уважением,".to_string());
    lines.push("Менеджер по развитию партнёрств".to_string());
    lines.push("Adlook".to_string());
    lines.push(String::new());
    lines.push(
        "P.S. Отвечу на письмо в течение 2 часов. Также можете позвонить или написать в Telegram для более быстрой связи.".to_string(),
    );

    lines.join("\n")
}

fn append_zone_list(lines: &mut Vec<String>, zones: &[&ZoneFinding]) {
    for (idx, zone) in zones.iter().enumerate() {
        let priority_ru = zone
            .priority
            .map(|p| p.as_russian())
            .unwrap_or("без приоритета");

        lines.push(format!("{}. {} ({})", idx + 1, zone.zone, priority_ru));
        if let Some(reason) = &zone.reason {
            lines.push(format!("   {}", reason));
        }
    }
}

fn site_type_phrase(site_type: &str) -> &'static str {
    match site_type.to_lowercase().as_str() {
        "news portal" | "news" => "новостного портала",
        "e-commerce" => "интернет-магазина",
        "blog" => "блога",
        "corporate site" | "corporate" => "корпоративного сайта",
        "forum" => "форума",
        "entertainment" => "развлекательного ресурса",
        "educational" => "образовательного портала",
        "magazine" => "онлайн-журнала",
        "media" => "медиа-ресурса",
        _ => "веб-ресурса",
    }
}

fn traffic_phrase(traffic_estimate: &str) -> &'static str {
    match traffic_estimate {
        "low" => "стабильной аудиторией",
        "medium" => "активной аудиторией",
        "high" => "внушительным трафиком",
        "very_high" => "огромной аудиторией",
        _ => "растущей аудиторией",
    }
}

fn revenue_estimate(traffic_estimate: &str) -> (u32, u32) {
    match traffic_estimate {
        "low" => (20_000, 60_000),
        "high" => (150_000, 500_000),
        "very_high" => (500_000, 2_000_000),
        // "medium" and anything unrecognized share one band.
        _ => (50_000, 150_000),
    }
}

fn category_paragraph(site_type: &str) -> Option<[&'static str; 3]> {
    let site_type = site_type.to_lowercase();

    if site_type.contains("news") || site_type.contains("media") {
        Some([
            "5. СПЕЦИАЛЬНЫЕ УСЛОВИЯ ДЛЯ НОВОСТНЫХ РЕСУРСОВ:",
            "   - Премиум-рекламодатели, готовые платить больше за новостную аудиторию",
            "   - Нативные форматы, органично вписывающиеся в контент",
        ])
    } else if site_type.contains("commerce") {
        Some([
            "5. СПЕЦИАЛЬНЫЕ УСЛОВИЯ ДЛЯ E-COMMERCE:",
            "   - Товарные рекомендации с высокой конверсией",
            "   - Динамические баннеры на основе поведения пользователей",
        ])
    } else if site_type.contains("blog") {
        Some([
            "5. СПЕЦИАЛЬНЫЕ УСЛОВИЯ ДЛЯ БЛОГОВ:",
            "   - Нативная реклама в стиле ваших статей",
            "   - Брендированный контент от надёжных рекламодателей",
        ])
    } else {
        None
    }
}

fn format_thousands(value: u32) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::zone::{Occupancy, Priority, ZoneFinding};

    fn zone(name: &str, priority: Priority, occupancy: Occupancy, reason: &str) -> ZoneFinding {
        ZoneFinding {
            zone: name.to_string(),
            priority: Some(priority),
            occupancy: Some(occupancy),
            size: None,
            reason: Some(reason.to_string()),
        }
    }

    #[test]
    fn blog_with_free_header_zone() {
        let zones = vec![zone("Header", Priority::High, Occupancy::Free, "visible")];
        let proposal = build_proposal("https://example.com", "blog", "medium", &zones);

        assert!(proposal.contains("ДОСТУПНЫЕ ЗОНЫ ДЛЯ РАЗМЕЩЕНИЯ (свободны):"));
        assert!(proposal.contains("1. Header (высокий приоритет)"));
        assert!(proposal.contains("   visible"));
        assert!(proposal.contains("СПЕЦИАЛЬНЫЕ УСЛОВИЯ ДЛЯ БЛОГОВ"));
        assert!(proposal.contains("от 50 000 до 150 000 рублей в месяц"));
        assert!(proposal.contains("качественный блога с активной аудиторией"));
        assert!(!proposal.contains("ЗАНЯТЫЕ ЗОНЫ"));
    }

    #[test]
    fn deterministic_output() {
        let zones = vec![
            zone("Header", Priority::High, Occupancy::Free, "visible"),
            zone("Sidebar", Priority::Medium, Occupancy::Occupied, "has AdSense"),
        ];

        let a = build_proposal("https://example.com", "news portal", "high", &zones);
        let b = build_proposal("https://example.com", "news portal", "high", &zones);

        assert_eq!(a, b);
    }

    #[test]
    fn occupied_zones_switch_revenue_pitch() {
        let zones = vec![zone(
            "Sidebar",
            Priority::Medium,
            Occupancy::Occupied,
            "has AdSense",
        )];
        let proposal = build_proposal("https://example.com", "forum", "high", &zones);

        assert!(proposal.contains("ЗАНЯТЫЕ ЗОНЫ (требуют оптимизации):"));
        assert!(proposal.contains("1. Sidebar (средний приоритет)"));
        assert!(proposal.contains("Даже при наличии текущей рекламы"));
        assert!(proposal.contains("от 150 000 до 500 000 рублей в месяц"));
        assert!(!proposal.contains("стабильный пассивный доход"));
    }

    #[test]
    fn unknown_site_type_and_traffic_fall_back() {
        let proposal = build_proposal("https://example.com", "metaverse hub", "astronomical", &[]);

        assert!(proposal.contains("качественный веб-ресурса с растущей аудиторией"));
        assert!(proposal.contains("от 50 000 до 150 000 рублей в месяц"));
        assert!(!proposal.contains("СПЕЦИАЛЬНЫЕ УСЛОВИЯ"));
        assert!(!proposal.contains("ДОСТУПНЫЕ ЗОНЫ"));
    }

    #[test]
    fn news_keyword_matches_first() {
        // "news media hub" matches the news/media branch, never e-commerce.
        let proposal = build_proposal("https://example.com", "news media hub", "low", &[]);

        assert!(proposal.contains("СПЕЦИАЛЬНЫЕ УСЛОВИЯ ДЛЯ НОВОСТНЫХ РЕСУРСОВ"));
        assert!(proposal.contains("от 20 000 до 60 000 рублей в месяц"));
    }

    #[test]
    fn zone_without_priority_still_renders() {
        let zones = vec![ZoneFinding {
            zone: "Footer".to_string(),
            priority: None,
            occupancy: Some(Occupancy::Free),
            size: None,
            reason: None,
        }];
        let proposal = build_proposal("https://example.com", "blog", "medium", &zones);

        assert!(proposal.contains("1. Footer (без приоритета)"));
    }

    #[test]
    fn thousands_formatting() {
        assert_eq!(format_thousands(20_000), "20 000");
        assert_eq!(format_thousands(2_000_000), "2 000 000");
        assert_eq!(format_thousands(500), "500");
    }
}
