use anyhow::Context;
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, ImageDetail, ImageUrlArgs, ResponseFormat,
    },
    Client,
};

use crate::domain::zone::{
    parse_site_response, parse_vision_response, SiteAnalysis, VisionAnalysis, ZoneFinding,
};

const VISION_MODEL: &str = "gpt-4o";
const TEXT_MODEL: &str = "gpt-4o-mini";
const HTML_SNIPPET_CHARS: usize = 8_000;

pub struct OpenaiClient {
    client: Client<OpenAIConfig>,
}

pub struct ProposalContext<'a> {
    pub website_url: &'a str,
    pub zones: &'a [ZoneFinding],
    pub language: &'a str,
    pub company_name: Option<&'a str>,
    pub owner_info: &'a str,
}

impl Default for OpenaiClient {
    fn default() -> Self {
        OpenaiClient {
            client: Client::new(),
        }
    }
}

impl OpenaiClient {
    pub fn new(api_key: String) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        OpenaiClient {
            client: Client::with_config(config),
        }
    }

    async fn first_choice_content(
        &self,
        request: CreateChatCompletionRequest,
    ) -> anyhow::Result<String> {
        let response = self.client.chat().create(request).await?;

        response
            .choices
            .first()
            .context("No choices in Openai response")?
            .message
            .content
            .clone()
            .context("No content in Openai response")
    }

    /// Vision stage: send the screenshot and ask for ad zones plus the site
    /// language as a JSON object.
    pub async fn analyze_screenshot_zones(
        &self,
        url: &str,
        screenshot_data_url: &str,
    ) -> anyhow::Result<VisionAnalysis> {
        let prompt = format!(
            r#"Проанализируй скриншот сайта {} и определи рекламные возможности.

Визуально оцени где можно разместить рекламу:
1. Header (шапка сайта, навигация)
2. Sidebar (боковая панель справа или слева)
3. Content (внутри контента, между блоками)
4. Footer (подвал сайта)
5. Popup (модальные окна)

Для каждой зоны укажи:
- name: название зоны
- available: true если место свободно, false если уже занято рекламой
- size: рекомендуемый размер баннера (например "728x90", "300x250")
- priority: "high" для самых заметных мест, "medium" для менее заметных
- description: где именно находится зона и почему она подходит

Верни JSON: {{"zones": [...], "language": "ru" или "en" (язык сайта)}}"#,
            url
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(VISION_MODEL)
            .messages([ChatCompletionRequestUserMessageArgs::default()
                .content(vec![
                    ChatCompletionRequestMessageContentPartTextArgs::default()
                        .text(prompt)
                        .build()?
                        .into(),
                    ChatCompletionRequestMessageContentPartImageArgs::default()
                        .image_url(
                            ImageUrlArgs::default()
                                .url(screenshot_data_url)
                                .detail(ImageDetail::High)
                                .build()?,
                        )
                        .build()?
                        .into(),
                ])
                .build()?
                .into()])
            .response_format(ResponseFormat::JsonObject)
            .max_tokens(2000_u32)
            .build()?;

        let content = self.first_choice_content(request).await?;
        parse_vision_response(&content)
    }

    /// HTML-analysis variant used by the simple analyze route: classify the
    /// site and find zones from a markup snippet instead of a screenshot.
    pub async fn analyze_site_structure(
        &self,
        url: &str,
        html_content: &str,
    ) -> anyhow::Result<SiteAnalysis> {
        let html_snippet: String = html_content.chars().take(HTML_SNIPPET_CHARS).collect();

        let prompt = format!(
            r#"You are an expert in web advertising and ad placement optimization.

Analyze the following website: {}

HTML structure (snippet):
{}

Provide:
1. siteType: category of the website (news portal, e-commerce, blog, corporate site, forum, entertainment, educational, magazine, media, ...)
2. trafficEstimate: low / medium / high / very_high based on structure and content volume
3. zones: optimal ad placement zones. For each zone give "zone" (Header, Sidebar, Content, Footer, Popup), "priority" (high/medium/low), "occupancy" ("occupied" if it already has ads, "free" otherwise) and a short "reason".

Only include zones that actually exist on the website.
Return ONLY a JSON object: {{"siteType": "...", "trafficEstimate": "...", "zones": [...]}}"#,
            url, html_snippet
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(TEXT_MODEL)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content("You are an expert web advertising analyst. Always respond with valid JSON only.")
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt)
                    .build()?
                    .into(),
            ])
            .response_format(ResponseFormat::JsonObject)
            .temperature(0.3)
            .max_tokens(1000_u32)
            .build()?;

        let content = self.first_choice_content(request).await?;
        parse_site_response(&content)
    }

    pub async fn research_company(
        &self,
        company_name: &str,
        website_url: &str,
    ) -> anyhow::Result<String> {
        let prompt = format!(
            r#"Найди информацию о компании "{}" (сайт: {}).

Используя общедоступную информацию, найди:
1. Полное название компании и юридическая форма (ООО, ИП и т.д.)
2. Имя руководителя/директора (если доступно)
3. Основная деятельность компании
4. Интересные факты или достижения

Если информации нет - честно напиши что не найдено.

Верни короткий отчёт (3-5 предложений) на русском языке."#,
            company_name, website_url
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(TEXT_MODEL)
            .messages([ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into()])
            .max_tokens(500_u32)
            .build()?;

        self.first_choice_content(request).await
    }

    pub async fn generate_proposal(&self, ctx: ProposalContext<'_>) -> anyhow::Result<String> {
        let available_zones: String = ctx
            .zones
            .iter()
            .filter(|z| z.is_free())
            .enumerate()
            .map(|(idx, zone)| {
                format!(
                    "{}. {} — {}\n",
                    idx + 1,
                    zone.zone,
                    zone.reason.as_deref().unwrap_or("")
                )
            })
            .collect();

        let prompt = match ctx.language {
            "en" => format!(
                r#"Generate a personalized commercial proposal in ENGLISH for advertising placement.

Website: {}
Company: {}
Owner info: {}
Available ad zones:
{}

Write a professional email following this structure:
1. Greeting (personalized if owner name available)
2. Compliment about their website/content
3. Brief about Adlook company
4. List of advertising opportunities
5. Call to action

Be professional and persuasive. Full email in English."#,
                ctx.website_url,
                ctx.company_name.unwrap_or("Website owner"),
                ctx.owner_info,
                available_zones
            ),
            _ => format!(
                r#"Сгенерируй персонализированное коммерческое предложение на РУССКОМ языке.

Сайт: {}
Компания: {}
Информация о владельце: {}
Доступные рекламные места:
{}

Напиши профессиональное письмо по структуре:
1. Приветствие (персонализированное если есть имя)
2. Комплимент про их сайт/контент (конкретный)
3. Кратко про компанию Adlook
4. Список рекламных возможностей
5. Призыв к действию

Без звёздочек (*). Профессиональный тон."#,
                ctx.website_url,
                ctx.company_name.unwrap_or("Владелец сайта"),
                ctx.owner_info,
                available_zones
            ),
        };

        let request = CreateChatCompletionRequestArgs::default()
            .model(TEXT_MODEL)
            .messages([ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into()])
            .temperature(0.7)
            .max_tokens(1500_u32)
            .build()?;

        self.first_choice_content(request).await
    }
}
